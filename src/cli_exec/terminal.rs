use std::future::Future;

use time::UtcOffset;

use meterman::dispatch::Prompter;
use meterman::model::{Gateway, Snapshot};
use meterman::reconcile::ViewSink;

use super::{print_snapshot, read_all, read_line};

/// Answers dispatcher dialogs on the controlling terminal.
///
/// `--yes` answers every question; `--body` answers the command prompt or
/// stands in for the configuration editor.
pub(super) struct TerminalPrompter {
    assume_yes: bool,
    body: Option<String>,
}

impl TerminalPrompter {
    pub(super) fn new(assume_yes: bool, body: Option<String>) -> Self {
        Self { assume_yes, body }
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, title: &str, question: &str) -> impl Future<Output = bool> + Send {
        let assume_yes = self.assume_yes;
        let prompt = format!("{}: {} [y/N] ", title, question);
        async move {
            if assume_yes {
                return true;
            }
            let answer = read_line(prompt).await.unwrap_or_default();
            matches!(answer.trim(), "y" | "Y" | "yes")
        }
    }

    fn prompt(
        &mut self,
        question: &str,
        label: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        let preset = self.body.take();
        let prompt = format!("{}\n{}: ", question, label);
        async move {
            match preset {
                Some(body) => Some(body),
                None => read_line(prompt).await,
            }
        }
    }

    fn edit_configuration(
        &mut self,
        gateway_id: &str,
        _current: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        let preset = self.body.take();
        let gateway_id = gateway_id.to_string();
        async move {
            match preset {
                Some(body) => Some(body),
                None => {
                    eprintln!("Reading configuration for {} from stdin", gateway_id);
                    read_all().await
                }
            }
        }
    }
}

/// Headless view for `watch`: prints each snapshot the store adopts.
pub(super) struct PrintViews {
    json: bool,
    offset: UtcOffset,
}

impl PrintViews {
    pub(super) fn new(json: bool, offset: UtcOffset) -> Self {
        Self { json, offset }
    }
}

impl ViewSink for PrintViews {
    fn on_snapshot_changed(&mut self, snapshot: &Snapshot, _selected: Option<&str>) {
        if self.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(err) => tracing::warn!("serialize snapshot: {}", err),
            }
        } else {
            print_snapshot(snapshot, self.offset);
        }
    }

    fn on_selection_changed(&mut self, _gateway: Option<&Gateway>) {}
}
