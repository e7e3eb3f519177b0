// JSON chart files
//
// Two shapes are understood: the flat array of 81 strings (the working file
// and share payload format) and 9 rows of 9 strings (the export format).

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::Deserialize;

use mandala_engine::coords::GRID_SIDE;
use mandala_engine::grid::Grid;

#[derive(Deserialize)]
#[serde(untagged)]
enum GridShape {
    Flat(Vec<String>),
    Rows(Vec<Vec<String>>),
}

/// Chart as 9 rows of 9 strings.
pub fn to_rows(grid: &Grid) -> Vec<Vec<String>> {
    grid.rows().map(|row| row.to_vec()).collect()
}

/// Export chart as a JSON array of 9 rows.
pub fn export(grid: &Grid, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &to_rows(grid)).map_err(|e| e.to_string())
}

/// Write the flat 81-string form.
pub fn write_grid(grid: &Grid, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let json = serde_json::to_string_pretty(grid).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

/// Read a chart file in either shape.
pub fn read_grid(path: &Path) -> Result<Grid, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    parse(&content)
}

/// Parse a chart from JSON text in either shape.
pub fn parse(content: &str) -> Result<Grid, String> {
    let shape: GridShape = serde_json::from_str(content)
        .map_err(|_| "expected an array of 81 strings or 9 rows of 9 strings".to_string())?;

    let cells = match shape {
        GridShape::Flat(cells) => cells,
        GridShape::Rows(rows) => {
            if rows.len() != GRID_SIDE {
                return Err(format!("expected {GRID_SIDE} rows, found {}", rows.len()));
            }
            if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != GRID_SIDE) {
                return Err(format!(
                    "row {} has {} cells, expected {GRID_SIDE}",
                    i + 1,
                    row.len()
                ));
            }
            rows.into_iter().flatten().collect()
        }
    };

    Grid::try_from(cells).map_err(|e| e.to_string())
}
