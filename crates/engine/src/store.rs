//! The mandala state store.
//!
//! `MandalaStore` is the only place the chart is mutated. Every write goes
//! through [`MandalaStore::update_cell`], which keeps the eight theme cells
//! of the center region and the centers of the outer regions in step:
//!
//! - writing text into a theme cell copies it into the linked region's
//!   center; blanking a theme cell empties the whole linked region.
//! - writing text into an outer region's center copies it back into the
//!   theme cell; blanking it empties the region and the theme cell.
//! - any other write touches only its own cell.
//!
//! Each successful mutation publishes a new `Grid` snapshot, bumps the
//! revision and notifies the event callback.

use std::collections::BTreeSet;

use log::debug;

use crate::activation::{self, RegionSet};
use crate::coords::{global_index, region_and_cell, Cell, Region};
use crate::error::GridError;
use crate::events::{
    CellsChangedEvent, EventCallback, GridEvent, ReplaceCause, ReplacedEvent,
    RevisionChangedEvent,
};
use crate::grid::{has_text, Grid};

pub struct MandalaStore {
    grid: Grid,
    revision: u64,
    on_event: Option<EventCallback>,
}

impl Default for MandalaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MandalaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MandalaStore")
            .field("revision", &self.revision)
            .field("filled", &self.grid.filled_count())
            .finish()
    }
}

impl MandalaStore {
    /// A store holding an empty chart at revision 0.
    pub fn new() -> Self {
        Self::with_grid(Grid::empty())
    }

    /// A store seeded with `grid` at revision 0. Like [`load`](Self::load),
    /// the grid is taken as-is.
    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            revision: 0,
            on_event: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// A handle to the current snapshot.
    pub fn snapshot(&self) -> Grid {
        self.grid.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Recomputed from the current grid on every call.
    pub fn active_regions(&self) -> RegionSet {
        activation::active_regions(&self.grid)
    }

    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.on_event = Some(callback);
    }

    pub fn clear_event_callback(&mut self) {
        self.on_event = None;
    }

    /// Write `value` at `index` and apply the linkage rules.
    ///
    /// The value is always stored verbatim at `index` first, even when it
    /// is whitespace-only and triggers a clear.
    pub fn update_cell(&mut self, index: usize, value: &str) -> Result<Grid, GridError> {
        let (region, cell) = region_and_cell(index)?;
        Ok(self.apply(index, region, cell, value))
    }

    /// Typed variant of [`update_cell`](Self::update_cell); cannot fail.
    pub fn update_at(&mut self, region: Region, cell: Cell, value: &str) -> Grid {
        self.apply(global_index(region, cell), region, cell, value)
    }

    fn apply(&mut self, index: usize, region: Region, cell: Cell, value: &str) -> Grid {
        let mut next = self.grid.clone();
        let mut changed = BTreeSet::new();
        let mut cascaded = false;

        if next.set(index, value) {
            changed.insert(index);
        }

        if region.is_center() && !cell.is_center() {
            if let Some(outer) = cell.linked_region() {
                if has_text(value) {
                    let target = outer.center_index();
                    if next.set(target, value) {
                        changed.insert(target);
                    }
                } else {
                    debug!("theme {} blanked, clearing region {}", cell, outer);
                    changed.extend(next.clear_region(outer));
                    cascaded = true;
                }
            }
        } else if cell.is_center() && !region.is_center() {
            if let Some(theme) = region.theme_cell() {
                let theme_index = global_index(Region::Center, theme);
                if has_text(value) {
                    if next.set(theme_index, value) {
                        changed.insert(theme_index);
                    }
                } else {
                    debug!("center of {} blanked, clearing region and theme", region);
                    changed.extend(next.clear_region(region));
                    if next.set(theme_index, "") {
                        changed.insert(theme_index);
                    }
                    cascaded = true;
                }
            }
        }

        self.grid = next;
        let revision = self.bump_revision();
        if !changed.is_empty() {
            self.emit(GridEvent::CellsChanged(CellsChangedEvent {
                revision,
                indices: changed.into_iter().collect(),
                cascaded,
            }));
        }
        self.emit_revision(revision);
        self.grid.clone()
    }

    /// Discard all content.
    pub fn reset(&mut self) -> Grid {
        self.replace(Grid::empty(), ReplaceCause::Reset)
    }

    /// Replace the chart wholesale.
    ///
    /// No synchronization pass runs: callers (templates, decoded share
    /// links, saved snapshots) hand over data that is already consistent.
    /// Use [`link_violations`] to inspect untrusted input first.
    pub fn load(&mut self, grid: Grid) -> Grid {
        self.replace(grid, ReplaceCause::Load)
    }

    fn replace(&mut self, grid: Grid, cause: ReplaceCause) -> Grid {
        self.grid = grid;
        let revision = self.bump_revision();
        self.emit(GridEvent::Replaced(ReplacedEvent { revision, cause }));
        self.emit_revision(revision);
        self.grid.clone()
    }

    fn bump_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn emit_revision(&mut self, revision: u64) {
        self.emit(GridEvent::RevisionChanged(RevisionChangedEvent {
            revision,
            previous: revision - 1,
        }));
    }

    fn emit(&mut self, event: GridEvent) {
        if let Some(callback) = self.on_event.as_mut() {
            callback(event);
        }
    }
}

/// A place where a grid breaks the theme/outer-center linkage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkViolation {
    /// Theme cell and the linked region's center disagree.
    Mismatch {
        region: Region,
        theme: String,
        center: String,
    },
    /// The region holds content while its theme cell is blank.
    Orphaned { region: Region },
}

impl std::fmt::Display for LinkViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mismatch { region, theme, center } => write!(
                f,
                "{region}: theme cell is {theme:?} but region center is {center:?}"
            ),
            Self::Orphaned { region } => write!(f, "{region}: region has content but no theme"),
        }
    }
}

/// Report every outer region whose content disagrees with its theme cell.
/// An empty result means the grid satisfies the store's invariant.
pub fn link_violations(grid: &Grid) -> Vec<LinkViolation> {
    let mut violations = Vec::new();
    for region in Region::outer() {
        let Some(theme_cell) = region.theme_cell() else {
            continue;
        };
        let theme = grid.at(Region::Center, theme_cell);
        let center = grid.at(region, Cell::Center);
        if has_text(theme) {
            if theme != center {
                violations.push(LinkViolation::Mismatch {
                    region,
                    theme: theme.to_string(),
                    center: center.to_string(),
                });
            }
        } else if grid.region(region).iter().any(|v| !v.is_empty()) {
            violations.push(LinkViolation::Orphaned { region });
        }
    }
    violations
}
