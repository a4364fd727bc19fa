use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use time::format_description::FormatItem;
use time::{OffsetDateTime, UtcOffset};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::dispatch::{Action, CommandDispatcher, DispatchOutcome};
use crate::remote::MetermanClient;
use crate::store::SnapshotStore;

use super::events::{ModalPrompter, UiEvent};
use super::modal::{self, Modal};
use super::views::DashboardViews;
use super::{RenderCtx, View};

mod event_loop;
mod log_types;
mod render;
mod runtime;
mod time_utils;

use self::log_types::{EntryKind, ScrollEntry};
pub(super) use self::runtime::run;
use self::time_utils::fmt_clock;

// Oldest entries fall off the session log past this many.
pub(in crate::tui_shell) const LOG_LIMIT: usize = 500;

pub(in crate::tui_shell) struct App {
    pub(in crate::tui_shell) store: SnapshotStore<DashboardViews>,
    pub(in crate::tui_shell) dispatcher: Arc<CommandDispatcher<MetermanClient>>,
    pub(in crate::tui_shell) handle: Handle,

    events_tx: UnboundedSender<UiEvent>,
    events_rx: UnboundedReceiver<UiEvent>,

    pub(in crate::tui_shell) modal: Option<Modal>,
    // Dialogs that arrived while another modal was open.
    pub(in crate::tui_shell) deferred: VecDeque<Modal>,

    pub(in crate::tui_shell) log: Vec<ScrollEntry>,
    pub(in crate::tui_shell) last_result: Option<ScrollEntry>,
    pub(in crate::tui_shell) last_sync: Option<OffsetDateTime>,
    pub(in crate::tui_shell) in_flight: usize,
    pub(in crate::tui_shell) offset: UtcOffset,

    pub(in crate::tui_shell) quit: bool,
}

impl App {
    pub(in crate::tui_shell) fn new(
        client: MetermanClient,
        handle: Handle,
        offset: UtcOffset,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store: SnapshotStore::new(DashboardViews::default()),
            dispatcher: Arc::new(CommandDispatcher::new(client)),
            handle,
            events_tx,
            events_rx,
            modal: None,
            deferred: VecDeque::new(),
            log: Vec::new(),
            last_result: None,
            last_sync: None,
            in_flight: 0,
            offset,
            quit: false,
        }
    }

    pub(in crate::tui_shell) fn events_tx(&self) -> UnboundedSender<UiEvent> {
        self.events_tx.clone()
    }

    pub(in crate::tui_shell) fn base_url(&self) -> &str {
        self.dispatcher.sink().base_url()
    }

    /// Applies everything background tasks have sent since the last frame.
    pub(in crate::tui_shell) fn drain_events(&mut self) {
        while let Ok(ev) = self.events_rx.try_recv() {
            self.apply_event(ev);
        }
    }

    pub(in crate::tui_shell) fn apply_event(&mut self, ev: UiEvent) {
        match ev {
            UiEvent::Snapshot(snapshot) => {
                self.store.replace_snapshot(snapshot);
                self.last_sync = Some(OffsetDateTime::now_utc());
            }
            UiEvent::Ask {
                title,
                question,
                reply,
            } => self.open_modal(Modal::confirm(&title, &question, reply)),
            UiEvent::Prompt {
                question,
                label,
                reply,
            } => self.open_modal(Modal::prompt(&question, &label, reply)),
            UiEvent::EditConfiguration {
                gateway,
                current,
                reply,
            } => self.open_modal(Modal::configure(&gateway, &current, reply)),
            UiEvent::CommandFinished {
                gateway,
                action,
                outcome,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match outcome {
                    DispatchOutcome::Sent => {
                        let line = format!("{} sent to {}", action.endpoint(), gateway);
                        self.push_output(vec![line]);
                    }
                    DispatchOutcome::Aborted => {
                        let line = format!("{} on {} cancelled", action.label(), gateway);
                        self.push_output(vec![line]);
                    }
                    DispatchOutcome::Failed(msg) => self.push_error(format!(
                        "{} on {} failed: {}",
                        action.endpoint(),
                        gateway,
                        msg
                    )),
                }
            }
        }
    }

    pub(in crate::tui_shell) fn open_modal(&mut self, modal: Modal) {
        if self.modal.is_some() {
            self.deferred.push_back(modal);
        } else {
            self.modal = Some(modal);
        }
    }

    pub(in crate::tui_shell) fn close_modal(&mut self) {
        self.modal = self.deferred.pop_front();
    }

    pub(in crate::tui_shell) fn select_neighbor(&mut self, delta: isize) {
        let next = self
            .store
            .views()
            .list
            .neighbor(delta)
            .map(str::to_string);
        if let Some(id) = next {
            self.store.select_gateway(Some(&id));
        }
    }

    pub(in crate::tui_shell) fn clear_selection(&mut self) {
        self.store.select_gateway(None);
    }

    /// Runs `action` against the selected gateway on the async runtime.
    /// Its dialogs come back as modal events; the outcome lands in the
    /// status panel.
    pub(in crate::tui_shell) fn start_action(&mut self, action: Action) {
        let Some(gateway) = self.store.current_gateway().cloned() else {
            self.push_error(format!("{}: no gateway selected", action.label()));
            return;
        };

        self.in_flight += 1;
        let dispatcher = Arc::clone(&self.dispatcher);
        let tx = self.events_tx.clone();
        self.handle.spawn(async move {
            let mut prompter = ModalPrompter::new(tx.clone());
            let outcome = dispatcher.dispatch(&mut prompter, action, &gateway).await;
            let _ = tx.send(UiEvent::CommandFinished {
                gateway: gateway.id,
                action,
                outcome,
            });
        });
    }

    pub(in crate::tui_shell) fn show_download(&mut self) {
        let Some(software) = self.store.snapshot().software_url.clone() else {
            self.push_error("no software download advertised".to_string());
            return;
        };
        let url = self.dispatcher.sink().resolve_url(&software);
        self.open_modal(Modal::viewer("Download", vec![url]));
    }

    pub(in crate::tui_shell) fn show_log(&mut self) {
        let mut lines = Vec::new();
        for entry in &self.log {
            let marker = match entry.kind {
                EntryKind::Output => "",
                EntryKind::Error => "error: ",
            };
            for (i, l) in entry.lines.iter().enumerate() {
                if i == 0 {
                    let clock = fmt_clock(entry.ts, self.offset);
                    lines.push(format!("{} {}{}", clock, marker, l));
                } else {
                    lines.push(format!("         {}", l));
                }
            }
        }
        if lines.is_empty() {
            lines.push("(empty)".to_string());
        }
        let mut modal = Modal::viewer("Log", lines);
        modal.scroll = modal.lines.len().saturating_sub(1);
        self.open_modal(modal);
    }

    pub(in crate::tui_shell) fn push_output(&mut self, lines: Vec<String>) {
        self.push_entry(EntryKind::Output, lines);
    }

    pub(in crate::tui_shell) fn push_error(&mut self, msg: String) {
        self.push_entry(EntryKind::Error, vec![msg]);
    }

    fn push_entry(&mut self, kind: EntryKind, lines: Vec<String>) {
        let entry = ScrollEntry {
            ts: OffsetDateTime::now_utc(),
            kind,
            lines,
        };
        self.log.push(entry.clone());
        if self.log.len() > LOG_LIMIT {
            let excess = self.log.len() - LOG_LIMIT;
            self.log.drain(..excess);
        }
        self.last_result = Some(entry);
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
