//! The single holder of the current snapshot and the user's selection.

use crate::model::{Gateway, Snapshot};
use crate::reconcile::{ViewSink, current_gateway, reconcile};

/// Holds the current snapshot and selection, and refreshes views on change.
///
/// `replace_snapshot` and `select_gateway` are the only mutation paths.
/// Both reconcile the views before returning.
pub struct SnapshotStore<V> {
    snapshot: Snapshot,
    selection: Option<String>,
    views: V,
}

impl<V: ViewSink> SnapshotStore<V> {
    pub fn new(views: V) -> Self {
        Self {
            snapshot: Snapshot::default(),
            selection: None,
            views,
        }
    }

    /// Overwrites the held snapshot. The caller has already established
    /// that the sequence changed.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        if self
            .selection
            .as_deref()
            .is_some_and(|id| !self.snapshot.contains(id))
        {
            self.selection = None;
        }
        self.reconcile();
    }

    /// Selects a gateway, or clears the selection for `None` / an empty id.
    pub fn select_gateway(&mut self, id: Option<&str>) {
        self.selection = id.filter(|id| !id.is_empty()).map(str::to_string);
        self.reconcile();
    }

    pub fn current_gateway(&self) -> Option<&Gateway> {
        current_gateway(&self.snapshot, self.selection.as_deref())
    }

    /// The selection, if it names a gateway of the current snapshot.
    pub fn selection(&self) -> Option<&str> {
        self.current_gateway().map(|gw| gw.id.as_str())
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn views(&self) -> &V {
        &self.views
    }

    /// View-local state only (scrolling and the like); data flows in through
    /// reconciliation.
    pub fn views_mut(&mut self) -> &mut V {
        &mut self.views
    }

    fn reconcile(&mut self) {
        reconcile(&self.snapshot, self.selection.as_deref(), &mut self.views);
    }
}

#[cfg(test)]
#[path = "tests/store/store_tests.rs"]
mod tests;
