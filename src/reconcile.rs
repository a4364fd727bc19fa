//! Decides which views refresh after the store changes, and with what data.
//!
//! There is no dirty tracking: every mutation refreshes both the list view
//! and the detail view. The detail view only ever receives a gateway taken
//! from the snapshot the list view was just given.

use crate::model::{Gateway, Snapshot};

/// The two top-level views, as seen by the reconciliation step.
pub trait ViewSink {
    /// List view: the whole snapshot plus the (already normalized) selection.
    fn on_snapshot_changed(&mut self, snapshot: &Snapshot, selected: Option<&str>);

    /// Detail view: the selected gateway of the current snapshot, if any.
    fn on_selection_changed(&mut self, gateway: Option<&Gateway>);
}

impl<V: ViewSink + ?Sized> ViewSink for &mut V {
    fn on_snapshot_changed(&mut self, snapshot: &Snapshot, selected: Option<&str>) {
        (**self).on_snapshot_changed(snapshot, selected);
    }

    fn on_selection_changed(&mut self, gateway: Option<&Gateway>) {
        (**self).on_selection_changed(gateway);
    }
}

/// Resolves a selection against a snapshot; absent ids resolve to nothing.
pub fn current_gateway<'a>(
    snapshot: &'a Snapshot,
    selection: Option<&str>,
) -> Option<&'a Gateway> {
    selection.and_then(|id| snapshot.gateway(id))
}

/// Gateways ordered most recently (re)started first.
///
/// Gateways that never reported a start time sort last. Ties keep the
/// snapshot's key order.
pub fn gateways_by_start(snapshot: &Snapshot) -> Vec<&Gateway> {
    let mut list: Vec<&Gateway> = snapshot.gateways.values().collect();
    list.sort_by(|a, b| b.up_since.cmp(&a.up_since));
    list
}

pub fn reconcile<V: ViewSink + ?Sized>(
    snapshot: &Snapshot,
    selection: Option<&str>,
    views: &mut V,
) {
    let current = current_gateway(snapshot, selection);
    views.on_snapshot_changed(snapshot, current.map(|gw| gw.id.as_str()));
    views.on_selection_changed(current);
}
