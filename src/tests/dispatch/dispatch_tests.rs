use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::*;

type Sent = Arc<Mutex<Vec<(String, String, Option<String>)>>>;

#[derive(Clone, Default)]
struct RecordingSink {
    sent: Sent,
    fail: bool,
}

impl CommandSink for RecordingSink {
    fn send_command(
        &self,
        gateway_id: &str,
        endpoint: &str,
        body: Option<String>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.sent
            .lock()
            .unwrap()
            .push((gateway_id.to_string(), endpoint.to_string(), body));
        let fail = self.fail;
        async move {
            if fail {
                anyhow::bail!("POST failed: 500 Internal Server Error");
            }
            Ok(())
        }
    }
}

/// Answers dialogs from canned responses. `edits` plays the configuration
/// dialog: each `Some(text)` is a submit attempt, `None` is cancel.
#[derive(Default)]
struct CannedPrompter {
    answer: bool,
    prompt_reply: Option<String>,
    edits: VecDeque<Option<String>>,
    questions: Vec<String>,
    prefill: Option<String>,
    dialog_messages: Vec<String>,
}

impl Prompter for CannedPrompter {
    fn ask(&mut self, _title: &str, question: &str) -> impl Future<Output = bool> + Send {
        self.questions.push(question.to_string());
        let answer = self.answer;
        async move { answer }
    }

    fn prompt(
        &mut self,
        question: &str,
        _label: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        self.questions.push(question.to_string());
        let reply = self.prompt_reply.clone();
        async move { reply }
    }

    fn edit_configuration(
        &mut self,
        _gateway_id: &str,
        current: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        self.prefill = Some(current.to_string());
        let mut editor = ConfigEditor::new(current);
        let mut result = None;
        while let Some(attempt) = self.edits.pop_front() {
            let Some(text) = attempt else {
                break;
            };
            editor.set_text(text);
            if let Some(accepted) = editor.submit() {
                result = Some(accepted);
                break;
            }
            self.dialog_messages
                .push(editor.message().unwrap_or_default().to_string());
        }
        async move { result }
    }
}

fn gateway() -> Gateway {
    Gateway {
        configuration: Some("{\"interval\": 60}".to_string()),
        ..Gateway::new("gw1")
    }
}

fn sent(sink: &RecordingSink) -> Vec<(String, String, Option<String>)> {
    sink.sent.lock().unwrap().clone()
}

#[tokio::test]
async fn confirmed_actions_send_one_request_without_body() {
    for (action, endpoint) in [
        (Action::Reset, "reset"),
        (Action::Rescan, "rescan"),
        (Action::Sync, "timesync"),
        (Action::Upgrade, "upgrade"),
        (Action::Forget, "forget"),
    ] {
        let sink = RecordingSink::default();
        let dispatcher = CommandDispatcher::new(sink.clone());
        let mut prompter = CannedPrompter {
            answer: true,
            ..CannedPrompter::default()
        };

        let outcome = dispatcher.dispatch(&mut prompter, action, &gateway()).await;
        assert_eq!(outcome, DispatchOutcome::Sent);
        assert_eq!(
            sent(&sink),
            vec![("gw1".to_string(), endpoint.to_string(), None)]
        );
        assert_eq!(prompter.questions.len(), 1);
        assert!(prompter.questions[0].contains("gw1"));
    }
}

#[tokio::test]
async fn declined_confirmation_sends_nothing() {
    let sink = RecordingSink::default();
    let dispatcher = CommandDispatcher::new(sink.clone());
    let mut prompter = CannedPrompter::default();

    let outcome = dispatcher
        .dispatch(&mut prompter, Action::Forget, &gateway())
        .await;
    assert_eq!(outcome, DispatchOutcome::Aborted);
    assert_eq!(prompter.questions, vec!["Forget gateway gw1?"]);
    assert!(sent(&sink).is_empty());
}

#[tokio::test]
async fn log_needs_no_confirmation() {
    let sink = RecordingSink::default();
    let dispatcher = CommandDispatcher::new(sink.clone());
    let mut prompter = CannedPrompter::default();

    let outcome = dispatcher.dispatch(&mut prompter, Action::Log, &gateway()).await;
    assert_eq!(outcome, DispatchOutcome::Sent);
    assert!(prompter.questions.is_empty());
    assert_eq!(sent(&sink)[0].1, "log");
}

#[tokio::test]
async fn command_sends_prompted_text_and_aborts_on_empty() {
    let sink = RecordingSink::default();
    let dispatcher = CommandDispatcher::new(sink.clone());

    let mut prompter = CannedPrompter {
        prompt_reply: Some("ls /var/log".to_string()),
        ..CannedPrompter::default()
    };
    let outcome = dispatcher
        .dispatch(&mut prompter, Action::Command, &gateway())
        .await;
    assert_eq!(outcome, DispatchOutcome::Sent);

    for reply in [Some(String::new()), None] {
        let mut prompter = CannedPrompter {
            prompt_reply: reply,
            ..CannedPrompter::default()
        };
        let outcome = dispatcher
            .dispatch(&mut prompter, Action::Command, &gateway())
            .await;
        assert_eq!(outcome, DispatchOutcome::Aborted);
    }

    assert_eq!(
        sent(&sink),
        vec![(
            "gw1".to_string(),
            "command".to_string(),
            Some("ls /var/log".to_string())
        )]
    );
}

#[tokio::test]
async fn configure_rejects_malformed_text_without_sending() {
    let sink = RecordingSink::default();
    let dispatcher = CommandDispatcher::new(sink.clone());
    let mut prompter = CannedPrompter {
        edits: VecDeque::from(vec![Some("{not json".to_string()), None]),
        ..CannedPrompter::default()
    };

    let outcome = dispatcher
        .dispatch(&mut prompter, Action::Configure, &gateway())
        .await;
    assert_eq!(outcome, DispatchOutcome::Aborted);
    assert_eq!(prompter.prefill.as_deref(), Some("{\"interval\": 60}"));
    assert_eq!(prompter.dialog_messages.len(), 1);
    assert!(!prompter.dialog_messages[0].is_empty());
    assert!(sent(&sink).is_empty());
}

#[tokio::test]
async fn configure_submits_exact_text_after_correction() {
    let sink = RecordingSink::default();
    let dispatcher = CommandDispatcher::new(sink.clone());
    let mut prompter = CannedPrompter {
        edits: VecDeque::from(vec![
            Some("{not json".to_string()),
            Some("{\"a\":1}".to_string()),
        ]),
        ..CannedPrompter::default()
    };

    let outcome = dispatcher
        .dispatch(&mut prompter, Action::Configure, &gateway())
        .await;
    assert_eq!(outcome, DispatchOutcome::Sent);
    assert_eq!(
        sent(&sink),
        vec![(
            "gw1".to_string(),
            "config".to_string(),
            Some("{\"a\":1}".to_string())
        )]
    );
}

#[tokio::test]
async fn transport_failure_is_reported_not_retried() {
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };
    let dispatcher = CommandDispatcher::new(sink.clone());
    let mut prompter = CannedPrompter {
        answer: true,
        ..CannedPrompter::default()
    };

    let outcome = dispatcher
        .dispatch(&mut prompter, Action::Reset, &gateway())
        .await;
    match outcome {
        DispatchOutcome::Failed(msg) => assert!(msg.contains("500")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(sent(&sink).len(), 1);
}

#[test]
fn config_editor_keeps_dialog_open_on_parse_error() {
    let mut editor = ConfigEditor::new("");
    editor.set_text("{not json".to_string());
    assert!(editor.submit().is_none());
    assert!(editor.message().is_some_and(|m| !m.is_empty()));

    editor.set_text("{\"a\":1}".to_string());
    assert_eq!(editor.submit().as_deref(), Some("{\"a\":1}"));
    assert!(editor.message().is_none());
}

#[test]
fn actions_parse_from_labels_and_endpoints() {
    assert_eq!("sync".parse::<Action>().unwrap(), Action::Sync);
    assert_eq!("timesync".parse::<Action>().unwrap(), Action::Sync);
    assert_eq!("Configure".parse::<Action>().unwrap(), Action::Configure);
    assert_eq!("config".parse::<Action>().unwrap(), Action::Configure);
    assert!("reboot".parse::<Action>().is_err());
    for action in Action::ALL {
        assert_eq!(action.endpoint().parse::<Action>().unwrap(), action);
    }
}
