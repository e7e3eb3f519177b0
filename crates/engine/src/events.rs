//! Change notifications emitted by the store.
//!
//! A front end subscribes once and re-renders on each event instead of
//! diffing snapshots. Tests use `EventCollector` to check ordering and
//! revision boundaries.

/// Events emitted by `MandalaStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Cells changed as a result of one `update_cell`, including cascades.
    CellsChanged(CellsChangedEvent),

    /// The whole grid was swapped out by `reset` or `load`.
    Replaced(ReplacedEvent),

    /// Revision number changed. Emitted exactly once per successful mutation.
    RevisionChanged(RevisionChangedEvent),
}

/// Emitted when one edit changes cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct CellsChangedEvent {
    /// Revision that produced these changes.
    pub revision: u64,
    /// Flat indices that changed, ascending.
    pub indices: Vec<usize>,
    /// True when the edit cleared a whole region.
    pub cascaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceCause {
    Reset,
    Load,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplacedEvent {
    pub revision: u64,
    pub cause: ReplaceCause,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevisionChangedEvent {
    /// The new revision number.
    pub revision: u64,
    /// The previous revision number.
    pub previous: u64,
}

/// Callback type for receiving store events.
pub type EventCallback = Box<dyn FnMut(GridEvent) + Send>;

/// Simple event collector for testing.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<GridEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only CellsChanged events.
    pub fn cells_changed(&self) -> Vec<&CellsChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::CellsChanged(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Filter to only Replaced events.
    pub fn replaced(&self) -> Vec<&ReplacedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::Replaced(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Filter to only RevisionChanged events.
    pub fn revision_changed(&self) -> Vec<&RevisionChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::RevisionChanged(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}
