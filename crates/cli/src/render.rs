// Plain-text rendering of charts for the terminal.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use mandala_engine::activation::active_regions;
use mandala_engine::coords::{region_and_cell, Region, GRID_SIDE};
use mandala_engine::grid::Grid;
use mandala_engine::navigation;

const BLOCK_SEP: &str = " | ";

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
/// Uses Unicode display width so CJK alignment stays correct.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .find(|ch| UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let text = truncate_display(s, width);
    let used = UnicodeWidthStr::width(text.as_str());
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

/// Cell text on one line.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn separator(cell_width: usize, blocks: usize) -> String {
    let block = "-".repeat(cell_width * 3 + 2);
    vec![block; blocks].join("-+-")
}

/// The full 9x9 chart. Cells of inactive regions are left blank unless
/// `show_inactive` is set.
pub(crate) fn render_grid(grid: &Grid, cell_width: usize, show_inactive: bool) -> String {
    let active = active_regions(grid);
    let mut lines = Vec::with_capacity(GRID_SIDE + 2);

    for (row, values) in grid.rows().enumerate() {
        if row > 0 && row % 3 == 0 {
            lines.push(separator(cell_width, 3));
        }
        let mut line = String::new();
        for (col, value) in values.iter().enumerate() {
            if col > 0 {
                line.push_str(if col % 3 == 0 { BLOCK_SEP } else { " " });
            }
            let visible = show_inactive
                || region_and_cell(row * GRID_SIDE + col)
                    .map(|(region, _)| active.contains(region))
                    .unwrap_or(false);
            let text = if visible { single_line(value) } else { String::new() };
            line.push_str(&pad_right(&text, cell_width));
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// One region as a 3x3 block.
pub(crate) fn render_region(grid: &Grid, region: Region, cell_width: usize) -> String {
    grid.region(region)
        .chunks(3)
        .map(|row| {
            row.iter()
                .map(|value| pad_right(&single_line(value), cell_width))
                .collect::<Vec<_>>()
                .join(BLOCK_SEP)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(&format!("\n{}\n", "-".repeat(cell_width * 3 + 2 * BLOCK_SEP.len())))
}

/// Tab bar of the active regions, `current` in brackets.
pub(crate) fn render_tabs(grid: &Grid, current: Region, max_chars: usize) -> String {
    navigation::tabs(grid, max_chars)
        .into_iter()
        .filter(|tab| tab.active)
        .map(|tab| {
            let label = single_line(&tab.label);
            if tab.region == current {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}
