//! Messages from background tasks to the UI thread.
//!
//! The sync engine and in-flight command dispatches never touch UI state
//! directly; they send events that the event loop applies between frames.

use std::future::Future;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

use crate::dispatch::{Action, DispatchOutcome, Prompter};
use crate::model::Snapshot;

#[derive(Debug)]
pub(super) enum UiEvent {
    Snapshot(Snapshot),
    Ask {
        title: String,
        question: String,
        reply: oneshot::Sender<bool>,
    },
    Prompt {
        question: String,
        label: String,
        reply: oneshot::Sender<Option<String>>,
    },
    EditConfiguration {
        gateway: String,
        current: String,
        reply: oneshot::Sender<Option<String>>,
    },
    CommandFinished {
        gateway: String,
        action: Action,
        outcome: DispatchOutcome,
    },
}

/// Answers dispatcher dialogs by opening modals on the UI thread.
///
/// A modal closed without an answer (or a UI that has gone away) counts as
/// cancel.
pub(super) struct ModalPrompter {
    tx: UnboundedSender<UiEvent>,
}

impl ModalPrompter {
    pub(super) fn new(tx: UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }
}

impl Prompter for ModalPrompter {
    fn ask(&mut self, title: &str, question: &str) -> impl Future<Output = bool> + Send {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .tx
            .send(UiEvent::Ask {
                title: title.to_string(),
                question: question.to_string(),
                reply,
            })
            .is_ok();
        async move { sent && rx.await.unwrap_or(false) }
    }

    fn prompt(
        &mut self,
        question: &str,
        label: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .tx
            .send(UiEvent::Prompt {
                question: question.to_string(),
                label: label.to_string(),
                reply,
            })
            .is_ok();
        async move {
            if !sent {
                return None;
            }
            rx.await.ok().flatten()
        }
    }

    fn edit_configuration(
        &mut self,
        gateway_id: &str,
        current: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .tx
            .send(UiEvent::EditConfiguration {
                gateway: gateway_id.to_string(),
                current: current.to_string(),
                reply,
            })
            .is_ok();
        async move {
            if !sent {
                return None;
            }
            rx.await.ok().flatten()
        }
    }
}
