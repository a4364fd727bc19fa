//! Turns operator actions into single command requests.
//!
//! Each action first goes through its confirmation step (a yes/no question,
//! a free-text prompt, or the configuration editor), then issues exactly one
//! request. Failures are reported and swallowed; the next state poll shows
//! whether the command had any effect.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use anyhow::Result;

use crate::model::Gateway;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Reset,
    Rescan,
    Sync,
    Upgrade,
    Forget,
    Log,
    Command,
    Configure,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Reset,
        Action::Rescan,
        Action::Sync,
        Action::Configure,
        Action::Upgrade,
        Action::Forget,
        Action::Command,
        Action::Log,
    ];

    /// Path segment of the command endpoint (`POST /meterman/<endpoint>`).
    pub fn endpoint(self) -> &'static str {
        match self {
            Action::Reset => "reset",
            Action::Rescan => "rescan",
            Action::Sync => "timesync",
            Action::Upgrade => "upgrade",
            Action::Forget => "forget",
            Action::Log => "log",
            Action::Command => "command",
            Action::Configure => "config",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Reset => "Reset",
            Action::Rescan => "Rescan",
            Action::Sync => "Sync",
            Action::Upgrade => "Upgrade",
            Action::Forget => "Forget",
            Action::Log => "Log",
            Action::Command => "Command",
            Action::Configure => "Configure",
        }
    }

    /// The yes/no question asked before actions that need one.
    pub fn confirmation(self, gateway_id: &str) -> Option<String> {
        let question = match self {
            Action::Reset => format!("Restart gateway {}?", gateway_id),
            Action::Rescan => format!("Rescan for new meters on gateway {}?", gateway_id),
            Action::Sync => format!("Synchronize time on gateway {}?", gateway_id),
            Action::Upgrade => format!("Upgrade software on gateway {}?", gateway_id),
            Action::Forget => format!("Forget gateway {}?", gateway_id),
            Action::Log | Action::Command | Action::Configure => return None,
        };
        Some(question)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let action = match s.as_str() {
            "reset" => Action::Reset,
            "rescan" => Action::Rescan,
            "sync" | "timesync" => Action::Sync,
            "upgrade" => Action::Upgrade,
            "forget" => Action::Forget,
            "log" => Action::Log,
            "command" => Action::Command,
            "configure" | "config" => Action::Configure,
            _ => anyhow::bail!(
                "unknown action `{}` (expected reset, rescan, sync, upgrade, forget, log, command or configure)",
                s
            ),
        };
        Ok(action)
    }
}

/// The human in the loop: dialogs answered asynchronously.
pub trait Prompter {
    fn ask(&mut self, title: &str, question: &str) -> impl Future<Output = bool> + Send;

    /// Free-text prompt; `None` when cancelled.
    fn prompt(
        &mut self,
        question: &str,
        label: &str,
    ) -> impl Future<Output = Option<String>> + Send;

    /// Opens the configuration editor pre-filled with `current`. Resolves to
    /// the edited text, which the editor has already validated, or `None`
    /// when cancelled.
    fn edit_configuration(
        &mut self,
        gateway_id: &str,
        current: &str,
    ) -> impl Future<Output = Option<String>> + Send;
}

/// Where command requests go, normally the HTTP client.
pub trait CommandSink {
    fn send_command(
        &self,
        gateway_id: &str,
        endpoint: &str,
        body: Option<String>,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Aborted,
    Failed(String),
}

pub struct CommandDispatcher<C> {
    sink: C,
}

impl<C: CommandSink> CommandDispatcher<C> {
    pub fn new(sink: C) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    pub async fn dispatch<P: Prompter>(
        &self,
        prompter: &mut P,
        action: Action,
        gateway: &Gateway,
    ) -> DispatchOutcome {
        let id = gateway.id.as_str();
        let body = match action {
            Action::Log => None,
            Action::Command => {
                let question = format!("Send command to gateway {}?", id);
                match prompter.prompt(&question, "Command").await {
                    Some(text) if !text.is_empty() => Some(text),
                    _ => return DispatchOutcome::Aborted,
                }
            }
            Action::Configure => {
                let Some(text) = prompter
                    .edit_configuration(id, gateway.configuration_text())
                    .await
                else {
                    return DispatchOutcome::Aborted;
                };
                if let Err(msg) = validate_configuration(&text) {
                    tracing::warn!(gateway = id, "refusing invalid configuration: {}", msg);
                    return DispatchOutcome::Aborted;
                }
                Some(text)
            }
            _ => {
                let question = action.confirmation(id).unwrap_or_default();
                if !prompter.ask(action.label(), &question).await {
                    return DispatchOutcome::Aborted;
                }
                None
            }
        };

        match self.sink.send_command(id, action.endpoint(), body).await {
            Ok(()) => {
                tracing::info!(gateway = id, action = action.endpoint(), "command sent");
                DispatchOutcome::Sent
            }
            Err(err) => {
                let msg = format!("{:#}", err);
                tracing::warn!(
                    gateway = id,
                    action = action.endpoint(),
                    "command failed: {}",
                    msg
                );
                DispatchOutcome::Failed(msg)
            }
        }
    }
}

/// Checks that configuration text is a syntactically valid JSON document.
pub fn validate_configuration(text: &str) -> std::result::Result<(), String> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

/// State of the configuration dialog: the text being edited and the inline
/// message shown when a submission was rejected.
#[derive(Clone, Debug, Default)]
pub struct ConfigEditor {
    text: String,
    message: Option<String>,
}

impl ConfigEditor {
    pub fn new(current: &str) -> Self {
        Self {
            text: current.to_string(),
            message: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the text to submit, or `None` (with a message set) when it
    /// does not parse. A rejected dialog stays open.
    pub fn submit(&mut self) -> Option<String> {
        match validate_configuration(&self.text) {
            Ok(()) => {
                self.message = None;
                Some(self.text.clone())
            }
            Err(msg) => {
                self.message = Some(msg);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatch/dispatch_tests.rs"]
mod tests;
