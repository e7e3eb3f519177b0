//! Region activation.
//!
//! An outer region is shown only once its theme cell in the center region
//! holds text. The set is always derived from a grid on demand; nothing
//! here is cached between mutations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::{global_index, theme_links, Region};
use crate::grid::{has_text, Grid};

/// A set of regions, stored as a bitmask over the nine slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Region>", from = "Vec<Region>")]
pub struct RegionSet {
    bits: u16,
}

impl RegionSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    #[inline]
    fn bit(region: Region) -> u16 {
        1 << region as u16
    }

    /// Returns true if the region was not already present.
    pub fn insert(&mut self, region: Region) -> bool {
        let had = self.contains(region);
        self.bits |= Self::bit(region);
        !had
    }

    pub fn remove(&mut self, region: Region) -> bool {
        let had = self.contains(region);
        self.bits &= !Self::bit(region);
        had
    }

    #[inline]
    pub fn contains(&self, region: Region) -> bool {
        self.bits & Self::bit(region) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Members in reading order.
    pub fn iter(&self) -> impl Iterator<Item = Region> + '_ {
        Region::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut set = Self::empty();
        for region in iter {
            set.insert(region);
        }
        set
    }
}

impl From<Vec<Region>> for RegionSet {
    fn from(regions: Vec<Region>) -> Self {
        regions.into_iter().collect()
    }
}

impl From<RegionSet> for Vec<Region> {
    fn from(set: RegionSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Regions eligible for display: `Center`, plus every outer region whose
/// theme cell holds non-whitespace text.
pub fn active_regions(grid: &Grid) -> RegionSet {
    let mut set = RegionSet::empty();
    set.insert(Region::Center);
    for (cell, region) in theme_links() {
        if has_text(grid.at(Region::Center, cell)) {
            set.insert(region);
        }
    }
    set
}

pub fn is_active(grid: &Grid, region: Region) -> bool {
    match region.theme_index() {
        None => true,
        Some(index) => has_text(&grid.cells()[index]),
    }
}

/// Number of outer regions that are active.
pub fn active_outer_count(grid: &Grid) -> usize {
    theme_links()
        .filter(|&(cell, _)| has_text(&grid.cells()[global_index(Region::Center, cell)]))
        .count()
}
