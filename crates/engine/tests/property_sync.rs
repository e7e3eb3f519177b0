// Property-based tests for the linkage rules of the store.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use mandala_engine::activation::active_regions;
use mandala_engine::coords::{global_index, region_and_cell, Cell, Position, Region, GRID_SIZE};
use mandala_engine::grid::has_text;
use mandala_engine::store::{link_violations, MandalaStore};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_region() -> impl Strategy<Value = Region> {
    prop::sample::select(Region::ALL.to_vec())
}

fn arb_cell() -> impl Strategy<Value = Cell> {
    prop::sample::select(Cell::ALL.to_vec())
}

/// Mostly text, sometimes empty, sometimes whitespace-only.
fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-zA-Z][a-zA-Z ]{0,11}",
        1 => Just(String::new()),
        1 => r"[ \t]{1,3}",
    ]
}

fn arb_edits() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((0..GRID_SIZE, arb_value()), 1..60)
}

/// Edits the way a front end issues them: cells of hidden regions are not
/// editable, except their center which doubles as the theme.
fn is_reachable(store: &MandalaStore, index: usize) -> bool {
    let Ok((region, cell)) = region_and_cell(index) else {
        return false;
    };
    region.is_center() || cell.is_center() || store.active_regions().contains(region)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn coordinates_round_trip(region in arb_region(), cell in arb_cell()) {
        let index = global_index(region, cell);
        prop_assert!(index < GRID_SIZE);
        prop_assert_eq!(region_and_cell(index).unwrap(), (region, cell));
    }

    #[test]
    fn position_text_round_trip(index in 0..GRID_SIZE) {
        let pos = Position::from_index(index).unwrap();
        let parsed: Position = pos.to_string().parse().unwrap();
        prop_assert_eq!(parsed.index(), index);
    }

    #[test]
    fn out_of_range_is_rejected(index in GRID_SIZE..usize::MAX) {
        prop_assert!(region_and_cell(index).is_err());
        let mut store = MandalaStore::new();
        prop_assert!(store.update_cell(index, "x").is_err());
        prop_assert_eq!(store.revision(), 0);
    }

    #[test]
    fn linkage_holds_after_any_edit_sequence(edits in arb_edits()) {
        let mut store = MandalaStore::new();
        for (index, value) in &edits {
            if !is_reachable(&store, *index) {
                continue;
            }
            store.update_cell(*index, value).unwrap();

            let grid = store.grid();
            prop_assert!(
                link_violations(grid).is_empty(),
                "violations after writing {:?} at {}: {:?}",
                value, index, link_violations(grid)
            );
        }
    }

    #[test]
    fn active_set_tracks_theme_cells(edits in arb_edits()) {
        let mut store = MandalaStore::new();
        for (index, value) in &edits {
            store.update_cell(*index, value).unwrap();
        }
        let grid = store.grid();
        let active = active_regions(grid);
        prop_assert!(active.contains(Region::Center));
        for region in Region::outer() {
            let theme = region.theme_index().unwrap();
            prop_assert_eq!(active.contains(region), has_text(&grid.cells()[theme]));
        }
    }

    #[test]
    fn edited_cell_keeps_value_unless_region_cleared(
        edits in arb_edits(),
        index in 0..GRID_SIZE,
        value in arb_value(),
    ) {
        let mut store = MandalaStore::new();
        for (i, v) in &edits {
            store.update_cell(*i, v).unwrap();
        }
        let grid = store.update_cell(index, &value).unwrap();
        let (region, cell) = region_and_cell(index).unwrap();
        let cleared_own_region = !region.is_center() && cell.is_center() && !has_text(&value);
        if cleared_own_region {
            prop_assert_eq!(grid.get(index), Some(""));
        } else {
            prop_assert_eq!(grid.get(index), Some(value.as_str()));
        }
    }

    #[test]
    fn earlier_snapshots_are_frozen(edits in arb_edits()) {
        let mut store = MandalaStore::new();
        let mut history = Vec::new();
        for (index, value) in &edits {
            let snapshot = store.update_cell(*index, value).unwrap();
            history.push((snapshot.clone(), Vec::<String>::from(snapshot)));
        }
        for (snapshot, copy) in history {
            prop_assert_eq!(snapshot.cells(), copy.as_slice());
        }
    }

    #[test]
    fn reset_always_empties(edits in arb_edits()) {
        let mut store = MandalaStore::new();
        for (index, value) in &edits {
            store.update_cell(*index, value).unwrap();
        }
        let grid = store.reset();
        prop_assert!(grid.is_blank());
        prop_assert_eq!(active_regions(&grid).len(), 1);
    }
}
