//! One-region-at-a-time navigation.
//!
//! Narrow front ends show a single 3x3 block plus a row of tabs. Tabs list
//! the center first; inactive regions stay listed but cannot be opened.

use serde::Serialize;

use crate::activation::{active_regions, RegionSet};
use crate::coords::{Region, MAIN_GOAL_INDEX};
use crate::grid::Grid;

/// Tab order: the center, then the outer regions in reading order.
pub const NAVIGATION_ORDER: [Region; 9] = [
    Region::Center,
    Region::TopLeft,
    Region::Top,
    Region::TopRight,
    Region::Left,
    Region::Right,
    Region::BottomLeft,
    Region::Bottom,
    Region::BottomRight,
];

/// Default tab label length, in characters.
pub const DEFAULT_LABEL_CHARS: usize = 8;

/// Label shown for a region with no theme text.
pub fn default_label(region: Region) -> &'static str {
    match region {
        Region::TopLeft => "Top Left",
        Region::Top => "Top",
        Region::TopRight => "Top Right",
        Region::Left => "Left",
        Region::Center => "Center",
        Region::Right => "Right",
        Region::BottomLeft => "Bottom Left",
        Region::Bottom => "Bottom",
        Region::BottomRight => "Bottom Right",
    }
}

/// Shorten `text` to at most `max_chars` characters, ending in `…` when cut.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

/// Tab label for `region`: its theme (the main goal for the center),
/// trimmed and truncated, or the default label when blank.
pub fn region_label(grid: &Grid, region: Region, max_chars: usize) -> String {
    let index = region.theme_index().unwrap_or(MAIN_GOAL_INDEX);
    let text = grid.cells()[index].trim();
    if text.is_empty() {
        default_label(region).to_string()
    } else {
        truncate_label(text, max_chars)
    }
}

/// The region to show when `requested` is asked for: itself if active,
/// otherwise the center.
pub fn resolve_view(grid: &Grid, requested: Region) -> Region {
    if active_regions(grid).contains(requested) {
        requested
    } else {
        Region::Center
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTab {
    pub region: Region,
    pub label: String,
    pub active: bool,
}

/// Tabs in navigation order.
pub fn tabs(grid: &Grid, max_chars: usize) -> Vec<RegionTab> {
    let active: RegionSet = active_regions(grid);
    NAVIGATION_ORDER
        .iter()
        .map(|&region| RegionTab {
            region,
            label: region_label(grid, region, max_chars),
            active: active.contains(region),
        })
        .collect()
}

/// Next active region after `from` in navigation order, wrapping around.
pub fn next_active(grid: &Grid, from: Region) -> Region {
    step_active(grid, from, 1)
}

/// Previous active region before `from` in navigation order, wrapping around.
pub fn prev_active(grid: &Grid, from: Region) -> Region {
    step_active(grid, from, NAVIGATION_ORDER.len() - 1)
}

fn step_active(grid: &Grid, from: Region, stride: usize) -> Region {
    let active = active_regions(grid);
    let len = NAVIGATION_ORDER.len();
    let start = NAVIGATION_ORDER
        .iter()
        .position(|&r| r == from)
        .unwrap_or(0);
    (1..=len)
        .map(|k| NAVIGATION_ORDER[(start + k * stride) % len])
        .find(|r| active.contains(*r))
        .unwrap_or(Region::Center)
}
