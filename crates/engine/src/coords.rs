//! Grid coordinates.
//!
//! The chart is a 9x9 matrix addressed either by a flat index (`0..81`,
//! row-major) or by a `(Region, Cell)` pair: the region picks one of the
//! nine 3x3 blocks and the cell picks a slot inside that block. Both
//! halves use the same reading order (top-left first, bottom-right last).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Number of cells in a chart.
pub const GRID_SIZE: usize = 81;

/// Cells per row (and rows per chart).
pub const GRID_SIDE: usize = 9;

const BLOCK_SIDE: usize = 3;

macro_rules! slot_enum {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            TopLeft,
            Top,
            TopRight,
            Left,
            Center,
            Right,
            BottomLeft,
            Bottom,
            BottomRight,
        }

        impl $name {
            /// All slots in reading order.
            pub const ALL: [$name; 9] = [
                $name::TopLeft,
                $name::Top,
                $name::TopRight,
                $name::Left,
                $name::Center,
                $name::Right,
                $name::BottomLeft,
                $name::Bottom,
                $name::BottomRight,
            ];

            #[inline]
            const fn ordinal(self) -> usize {
                self as usize
            }

            #[inline]
            const fn row(self) -> usize {
                self.ordinal() / BLOCK_SIDE
            }

            #[inline]
            const fn col(self) -> usize {
                self.ordinal() % BLOCK_SIDE
            }

            #[inline]
            pub fn is_center(self) -> bool {
                self == $name::Center
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $name::TopLeft => "top_left",
                    $name::Top => "top",
                    $name::TopRight => "top_right",
                    $name::Left => "left",
                    $name::Center => "center",
                    $name::Right => "right",
                    $name::BottomLeft => "bottom_left",
                    $name::Bottom => "bottom",
                    $name::BottomRight => "bottom_right",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = GridError;

            /// Accepts snake_case, kebab-case or the short forms `tl`, `t`,
            /// `tr`, `l`, `c`, `r`, `bl`, `b`, `br` (case-insensitive).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = s.trim().to_ascii_lowercase().replace('-', "_");
                let slot = match key.as_str() {
                    "top_left" | "topleft" | "tl" => $name::TopLeft,
                    "top" | "t" => $name::Top,
                    "top_right" | "topright" | "tr" => $name::TopRight,
                    "left" | "l" => $name::Left,
                    "center" | "centre" | "c" => $name::Center,
                    "right" | "r" => $name::Right,
                    "bottom_left" | "bottomleft" | "bl" => $name::BottomLeft,
                    "bottom" | "b" => $name::Bottom,
                    "bottom_right" | "bottomright" | "br" => $name::BottomRight,
                    _ => return Err(GridError::UnknownPosition(s.to_string())),
                };
                Ok(slot)
            }
        }
    };
}

slot_enum!(
    /// One of the nine 3x3 blocks of the chart.
    ///
    /// `Center` holds the main goal and the eight theme cells; every other
    /// region expands one theme.
    Region
);

slot_enum!(
    /// A slot inside a single 3x3 block.
    Cell
);

/// Theme cells of the center region paired with the outer region each one
/// heads. This is the only declaration of the linkage; lookups in the other
/// direction walk the same table.
const THEME_LINKS: [(Cell, Region); 8] = [
    (Cell::TopLeft, Region::TopLeft),
    (Cell::Top, Region::Top),
    (Cell::TopRight, Region::TopRight),
    (Cell::Left, Region::Left),
    (Cell::Right, Region::Right),
    (Cell::BottomLeft, Region::BottomLeft),
    (Cell::Bottom, Region::Bottom),
    (Cell::BottomRight, Region::BottomRight),
];

/// Flat index of the main goal, `(Center, Center)`.
pub const MAIN_GOAL_INDEX: usize = global_index(Region::Center, Cell::Center);

/// Map a `(region, cell)` pair to its flat index.
#[inline]
pub const fn global_index(region: Region, cell: Cell) -> usize {
    let row = region.row() * BLOCK_SIDE + cell.row();
    let col = region.col() * BLOCK_SIDE + cell.col();
    row * GRID_SIDE + col
}

/// Inverse of [`global_index`].
pub fn region_and_cell(index: usize) -> Result<(Region, Cell), GridError> {
    if index >= GRID_SIZE {
        return Err(GridError::IndexOutOfRange { index });
    }
    let row = index / GRID_SIDE;
    let col = index % GRID_SIDE;
    let region = Region::ALL[(row / BLOCK_SIDE) * BLOCK_SIDE + col / BLOCK_SIDE];
    let cell = Cell::ALL[(row % BLOCK_SIDE) * BLOCK_SIDE + col % BLOCK_SIDE];
    Ok((region, cell))
}

pub fn all_regions() -> [Region; 9] {
    Region::ALL
}

pub fn all_cells() -> [Cell; 9] {
    Cell::ALL
}

/// Every `(theme cell, outer region)` pair.
pub fn theme_links() -> impl Iterator<Item = (Cell, Region)> {
    THEME_LINKS.iter().copied()
}

impl Cell {
    /// Outer region headed by this cell of the center region.
    /// `None` for `Center`, which holds the main goal.
    pub fn linked_region(self) -> Option<Region> {
        THEME_LINKS
            .iter()
            .find(|(cell, _)| *cell == self)
            .map(|&(_, region)| region)
    }
}

impl Region {
    /// The eight regions around the center, in reading order.
    pub fn outer() -> impl Iterator<Item = Region> {
        Region::ALL.into_iter().filter(|r| !r.is_center())
    }

    /// Cell of the center region that holds this region's theme.
    /// `None` for `Center` itself.
    pub fn theme_cell(self) -> Option<Cell> {
        THEME_LINKS
            .iter()
            .find(|(_, region)| *region == self)
            .map(|&(cell, _)| cell)
    }

    /// Flat index of this region's theme cell inside the center region.
    pub fn theme_index(self) -> Option<usize> {
        self.theme_cell().map(|cell| global_index(Region::Center, cell))
    }

    /// Flat index of this region's own center cell.
    pub fn center_index(self) -> usize {
        global_index(self, Cell::Center)
    }

    /// Flat indices of all nine cells, in cell order.
    pub fn indices(self) -> [usize; 9] {
        Cell::ALL.map(|cell| global_index(self, cell))
    }
}

/// A `(region, cell)` address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub region: Region,
    pub cell: Cell,
}

impl Position {
    pub const MAIN_GOAL: Position = Position {
        region: Region::Center,
        cell: Cell::Center,
    };

    #[inline]
    pub fn new(region: Region, cell: Cell) -> Self {
        Self { region, cell }
    }

    #[inline]
    pub fn index(self) -> usize {
        global_index(self.region, self.cell)
    }

    pub fn from_index(index: usize) -> Result<Self, GridError> {
        let (region, cell) = region_and_cell(index)?;
        Ok(Self { region, cell })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.cell)
    }
}

impl FromStr for Position {
    type Err = GridError;

    /// Parses either a flat index (`"40"`) or `region:cell`
    /// (`"center:top_left"`, `"c:tl"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(index) = text.parse::<usize>() {
            return Self::from_index(index);
        }
        let (region, cell) = text
            .split_once(':')
            .ok_or_else(|| GridError::UnknownPosition(s.to_string()))?;
        Ok(Self {
            region: region.parse()?,
            cell: cell.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip_all_pairs() {
        for region in all_regions() {
            for cell in all_cells() {
                let index = global_index(region, cell);
                assert_eq!(region_and_cell(index).unwrap(), (region, cell));
            }
        }
    }

    #[test]
    fn test_indices_cover_grid_once() {
        let seen: HashSet<usize> = all_regions()
            .into_iter()
            .flat_map(|r| all_cells().into_iter().map(move |c| global_index(r, c)))
            .collect();
        assert_eq!(seen.len(), GRID_SIZE);
        assert!(seen.iter().all(|&i| i < GRID_SIZE));
    }

    #[test]
    fn test_known_indices() {
        assert_eq!(MAIN_GOAL_INDEX, 40);
        assert_eq!(global_index(Region::TopLeft, Cell::TopLeft), 0);
        assert_eq!(global_index(Region::TopLeft, Cell::Center), 10);
        assert_eq!(global_index(Region::Top, Cell::TopLeft), 3);
        assert_eq!(global_index(Region::Center, Cell::TopLeft), 30);
        assert_eq!(global_index(Region::Center, Cell::BottomRight), 50);
        assert_eq!(global_index(Region::BottomRight, Cell::BottomRight), 80);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            region_and_cell(81),
            Err(GridError::IndexOutOfRange { index: 81 })
        );
        assert!(Position::from_index(usize::MAX).is_err());
    }

    #[test]
    fn test_links_agree_both_ways() {
        assert_eq!(theme_links().count(), 8);
        for (cell, region) in theme_links() {
            assert_eq!(cell.linked_region(), Some(region));
            assert_eq!(region.theme_cell(), Some(cell));
        }
        assert_eq!(Cell::Center.linked_region(), None);
        assert_eq!(Region::Center.theme_cell(), None);
    }

    #[test]
    fn test_links_preserve_slot() {
        for (cell, region) in theme_links() {
            assert_eq!(cell.as_str(), region.as_str());
        }
    }

    #[test]
    fn test_region_indices() {
        assert_eq!(Region::TopLeft.indices(), [0, 1, 2, 9, 10, 11, 18, 19, 20]);
        assert_eq!(Region::Right.center_index(), 43);
        assert_eq!(Region::Right.theme_index(), Some(41));
        assert_eq!(Region::outer().count(), 8);
    }

    #[test]
    fn test_parse_slots() {
        assert_eq!("top_left".parse::<Region>().unwrap(), Region::TopLeft);
        assert_eq!("Bottom-Right".parse::<Cell>().unwrap(), Cell::BottomRight);
        assert_eq!("c".parse::<Region>().unwrap(), Region::Center);
        assert!("middle".parse::<Region>().is_err());
    }

    #[test]
    fn test_parse_position() {
        assert_eq!("40".parse::<Position>().unwrap(), Position::MAIN_GOAL);
        assert_eq!(
            "center:tl".parse::<Position>().unwrap(),
            Position::new(Region::Center, Cell::TopLeft)
        );
        assert_eq!(
            "81".parse::<Position>(),
            Err(GridError::IndexOutOfRange { index: 81 })
        );
        assert!("center".parse::<Position>().is_err());
    }

    #[test]
    fn test_display() {
        let pos = Position::new(Region::BottomLeft, Cell::Top);
        assert_eq!(format!("{}", pos), "bottom_left:top");
        assert_eq!(pos.to_string().parse::<Position>().unwrap(), pos);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Region::TopRight).unwrap();
        assert_eq!(json, "\"top_right\"");
    }
}
