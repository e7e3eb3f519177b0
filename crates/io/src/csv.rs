// CSV/TSV import/export
//
// A chart is always 9 records of 9 fields, empty cells included, so files
// line up with the on-screen matrix.

use std::io::Read;
use std::path::Path;

use mandala_engine::coords::GRID_SIDE;
use mandala_engine::grid::Grid;

pub fn import(path: &Path) -> Result<Grid, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Grid, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(GRID_SIDE).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // A chart row has exactly nine fields; prefer delimiters that agree
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let bonus = if target == GRID_SIDE { 2 } else { 1 };
        let score = consistent * bonus;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn import_from_string(content: &str, delimiter: u8) -> Result<Grid, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut cells = Vec::with_capacity(GRID_SIDE * GRID_SIDE);
    let mut rows = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows += 1;
        if rows > GRID_SIDE {
            return Err(format!("expected {GRID_SIDE} rows, found more"));
        }
        if record.len() != GRID_SIDE {
            return Err(format!(
                "row {rows} has {} fields, expected {GRID_SIDE}",
                record.len()
            ));
        }
        cells.extend(record.iter().map(str::to_string));
    }

    if rows != GRID_SIDE {
        return Err(format!("expected {GRID_SIDE} rows, found {rows}"));
    }

    Grid::try_from(cells).map_err(|e| e.to_string())
}

pub fn export(grid: &Grid, path: &Path) -> Result<(), String> {
    export_with_delimiter(grid, path, b',')
}

pub fn export_tsv(grid: &Grid, path: &Path) -> Result<(), String> {
    export_with_delimiter(grid, path, b'\t')
}

fn export_with_delimiter(grid: &Grid, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    for row in grid.rows() {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

/// Render the chart as CSV text.
pub fn export_to_string(grid: &Grid) -> Result<String, String> {
    export_string_with_delimiter(grid, b',')
}

/// Render the chart as tab-separated text.
pub fn export_tsv_to_string(grid: &Grid) -> Result<String, String> {
    export_string_with_delimiter(grid, b'\t')
}

fn export_string_with_delimiter(grid: &Grid, delimiter: u8) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in grid.rows() {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
