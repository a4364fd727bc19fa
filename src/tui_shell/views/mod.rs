mod gateway;
mod gateways;

pub(super) use gateway::GatewayView;
pub(super) use gateways::GatewaysView;

use crate::model::{Gateway, Snapshot};
use crate::reconcile::ViewSink;

/// The two panes the store keeps in sync: gateway list on the left, the
/// selected gateway's detail on the right.
#[derive(Debug, Default)]
pub(super) struct DashboardViews {
    pub(super) list: GatewaysView,
    pub(super) detail: GatewayView,
}

impl ViewSink for DashboardViews {
    fn on_snapshot_changed(&mut self, snapshot: &Snapshot, selected: Option<&str>) {
        self.list.update(snapshot, selected);
    }

    fn on_selection_changed(&mut self, gateway: Option<&Gateway>) {
        self.detail.update(gateway);
    }
}
