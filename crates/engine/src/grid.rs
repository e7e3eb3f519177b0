//! Chart snapshots.
//!
//! A `Grid` is an immutable value of exactly 81 strings. Clones share the
//! same allocation; the store copies on write, so a snapshot handed to a
//! caller never changes underneath it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coords::{global_index, Cell, Region, GRID_SIDE, GRID_SIZE, MAIN_GOAL_INDEX};
use crate::error::GridError;

/// True when `value` holds anything besides whitespace.
#[inline]
pub fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Grid {
    cells: Arc<Vec<String>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    /// 81 empty strings.
    pub fn empty() -> Self {
        Self {
            cells: Arc::new(vec![String::new(); GRID_SIZE]),
        }
    }

    /// Build a chart by asking `f` for every `(region, cell)` pair.
    pub fn from_fn(mut f: impl FnMut(Region, Cell) -> String) -> Self {
        let mut cells = vec![String::new(); GRID_SIZE];
        for region in Region::ALL {
            for cell in Cell::ALL {
                cells[global_index(region, cell)] = f(region, cell);
            }
        }
        Self {
            cells: Arc::new(cells),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn at(&self, region: Region, cell: Cell) -> &str {
        &self.cells[global_index(region, cell)]
    }

    pub fn main_goal(&self) -> &str {
        &self.cells[MAIN_GOAL_INDEX]
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(String::as_str)
    }

    /// The nine rows of the 9x9 matrix, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(GRID_SIDE)
    }

    /// Values of one region in cell order.
    pub fn region(&self, region: Region) -> [&str; 9] {
        Cell::ALL.map(|cell| self.at(region, cell))
    }

    /// True when no cell holds any text at all.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Number of cells holding non-whitespace text.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| has_text(c)).count()
    }

    /// True if both snapshots share the same allocation.
    pub fn same_snapshot(&self, other: &Grid) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }

    /// Write one cell. Returns whether the stored value changed.
    /// Callers validate `index` first.
    pub(crate) fn set(&mut self, index: usize, value: &str) -> bool {
        if self.cells[index] == value {
            return false;
        }
        Arc::make_mut(&mut self.cells)[index] = value.to_string();
        true
    }

    /// Empty every cell of `region`, returning the indices that changed.
    pub(crate) fn clear_region(&mut self, region: Region) -> Vec<usize> {
        region
            .indices()
            .into_iter()
            .filter(|&index| self.set(index, ""))
            .collect()
    }
}

impl TryFrom<Vec<String>> for Grid {
    type Error = GridError;

    fn try_from(cells: Vec<String>) -> Result<Self, Self::Error> {
        if cells.len() != GRID_SIZE {
            return Err(GridError::MalformedGrid { len: cells.len() });
        }
        Ok(Self {
            cells: Arc::new(cells),
        })
    }
}

impl From<Grid> for Vec<String> {
    fn from(grid: Grid) -> Self {
        Arc::try_unwrap(grid.cells).unwrap_or_else(|shared| (*shared).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_81_cells() {
        let grid = Grid::empty();
        assert_eq!(grid.cells().len(), GRID_SIZE);
        assert!(grid.is_blank());
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_try_from_rejects_wrong_length() {
        let short = vec![String::new(); 80];
        assert_eq!(
            Grid::try_from(short),
            Err(GridError::MalformedGrid { len: 80 })
        );
        assert!(Grid::try_from(vec![String::new(); 81]).is_ok());
    }

    #[test]
    fn test_set_copies_on_write() {
        let original = Grid::empty();
        let mut next = original.clone();
        assert!(next.same_snapshot(&original));

        assert!(next.set(5, "goal"));
        assert!(!next.same_snapshot(&original));
        assert_eq!(original.get(5), Some(""));
        assert_eq!(next.get(5), Some("goal"));

        // Same value is a no-op
        assert!(!next.set(5, "goal"));
    }

    #[test]
    fn test_clear_region_reports_changes() {
        let mut grid = Grid::empty();
        grid.set(global_index(Region::Top, Cell::Left), "a");
        grid.set(global_index(Region::Top, Cell::Center), "b");
        grid.set(global_index(Region::Left, Cell::Center), "other");

        let changed = grid.clear_region(Region::Top);
        assert_eq!(changed, vec![12, 13]);
        assert!(grid.region(Region::Top).iter().all(|v| v.is_empty()));
        assert_eq!(grid.at(Region::Left, Cell::Center), "other");
    }

    #[test]
    fn test_from_fn_addresses_every_pair() {
        let grid = Grid::from_fn(|region, cell| format!("{}:{}", region, cell));
        assert_eq!(grid.get(0), Some("top_left:top_left"));
        assert_eq!(grid.main_goal(), "center:center");
        assert_eq!(grid.get(80), Some("bottom_right:bottom_right"));
        assert_eq!(grid.at(Region::Top, Cell::Left), "top:left");
    }

    #[test]
    fn test_rows_are_row_major() {
        let mut grid = Grid::empty();
        grid.set(9, "row1col0");
        let rows: Vec<&[String]> = grid.rows().collect();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[1][0], "row1col0");
    }

    #[test]
    fn test_has_text() {
        assert!(has_text("x"));
        assert!(has_text("  x "));
        assert!(!has_text(""));
        assert!(!has_text(" \t\n"));
    }

    #[test]
    fn test_serde_is_flat_array() {
        let mut grid = Grid::empty();
        grid.set(MAIN_GOAL_INDEX, "Main");
        let json = serde_json::to_string(&grid).unwrap();
        let raw: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(raw.len(), 81);
        assert_eq!(raw[40], "Main");

        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let bad = serde_json::from_str::<Grid>("[\"a\", \"b\"]");
        assert!(bad.is_err());
    }
}
