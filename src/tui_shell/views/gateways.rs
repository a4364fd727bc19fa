use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{List, ListItem, ListState};

use crate::model::Snapshot;
use crate::reconcile::gateways_by_start;

use super::super::{RenderCtx, View, render_view_chrome};

/// Gateway ids, most recently started first.
#[derive(Debug, Default)]
pub(in crate::tui_shell) struct GatewaysView {
    pub(in crate::tui_shell) ids: Vec<String>,
    pub(in crate::tui_shell) selected: Option<String>,
}

impl GatewaysView {
    pub(super) fn update(&mut self, snapshot: &Snapshot, selected: Option<&str>) {
        self.ids = gateways_by_start(snapshot)
            .into_iter()
            .map(|gw| gw.id.clone())
            .collect();
        self.selected = selected.map(str::to_string);
    }

    pub(in crate::tui_shell) fn selected_index(&self) -> Option<usize> {
        let sel = self.selected.as_deref()?;
        self.ids.iter().position(|id| id == sel)
    }

    /// The id `delta` rows away from the current selection, clamped to the
    /// list. With nothing selected, moving down picks the first row and
    /// moving up picks the last.
    pub(in crate::tui_shell) fn neighbor(&self, delta: isize) -> Option<&str> {
        if self.ids.is_empty() {
            return None;
        }
        let last = self.ids.len() - 1;
        let idx = match self.selected_index() {
            Some(i) => (i as isize + delta).clamp(0, last as isize) as usize,
            None if delta < 0 => last,
            None => 0,
        };
        self.ids.get(idx).map(String::as_str)
    }
}

impl View for GatewaysView {
    fn title(&self) -> String {
        format!("Gateways ({})", self.ids.len())
    }

    fn render(&self, frame: &mut ratatui::Frame, area: Rect, _ctx: &RenderCtx) {
        let inner = render_view_chrome(frame, &self.title(), area);

        let selected = self.selected_index();
        let mut rows: Vec<ListItem> = self
            .ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let style = if Some(i) == selected {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(id.clone()).style(style)
            })
            .collect();
        if rows.is_empty() {
            rows.push(ListItem::new("(no gateways)"));
        }

        let mut state = ListState::default();
        state.select(selected);
        let list = List::new(rows).highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, inner, &mut state);
    }
}
