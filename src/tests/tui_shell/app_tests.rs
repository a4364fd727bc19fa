use super::*;

use tokio::sync::oneshot;

use crate::model::{Gateway, SeqToken, Snapshot};

use super::event_loop::handle_key;
use super::modal::ModalKind;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

fn app(rt: &tokio::runtime::Runtime) -> App {
    // Nothing listens on the discard port; commands that get that far fail.
    let client = MetermanClient::new("http://127.0.0.1:9").unwrap();
    App::new(client, rt.handle().clone(), UtcOffset::UTC)
}

fn snapshot(seq: u64, gateways: &[(&str, i64)]) -> Snapshot {
    let mut snap = Snapshot {
        sequence: SeqToken::from(seq),
        ..Snapshot::default()
    };
    for (id, ts) in gateways {
        let mut gw = Gateway::new(*id);
        gw.up_since = Some(*ts);
        snap.gateways.insert(id.to_string(), gw);
    }
    snap
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn wait_until(app: &mut App, mut done: impl FnMut(&App) -> bool) {
    for _ in 0..500 {
        app.drain_events();
        if done(app) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for UI event");
}

#[test]
fn arrow_keys_walk_gateways_newest_first() {
    let rt = runtime();
    let mut app = app(&rt);
    app.apply_event(UiEvent::Snapshot(snapshot(1, &[("old", 100), ("new", 200)])));
    assert_eq!(app.store.views().list.ids, vec!["new", "old"]);

    handle_key(&mut app, code(KeyCode::Down));
    assert_eq!(app.store.selection(), Some("new"));
    handle_key(&mut app, code(KeyCode::Down));
    assert_eq!(app.store.selection(), Some("old"));
    handle_key(&mut app, code(KeyCode::Down));
    assert_eq!(app.store.selection(), Some("old"));
    handle_key(&mut app, code(KeyCode::Up));
    assert_eq!(app.store.selection(), Some("new"));

    let detail = app.store.views().detail.gateway.as_ref().map(|g| g.id.as_str());
    assert_eq!(detail, Some("new"));

    handle_key(&mut app, code(KeyCode::Esc));
    assert_eq!(app.store.selection(), None);
    assert!(!app.quit);
    handle_key(&mut app, code(KeyCode::Esc));
    assert!(app.quit);
}

#[test]
fn vanished_gateway_clears_detail_pane() {
    let rt = runtime();
    let mut app = app(&rt);
    app.apply_event(UiEvent::Snapshot(snapshot(1, &[("a", 1), ("b", 2)])));
    app.store.select_gateway(Some("a"));
    assert!(app.store.views().detail.gateway.is_some());

    app.apply_event(UiEvent::Snapshot(snapshot(2, &[("b", 2)])));
    assert_eq!(app.store.selection(), None);
    assert!(app.store.views().detail.gateway.is_none());
    assert!(app.last_sync.is_some());
}

#[test]
fn action_without_selection_reports_error() {
    let rt = runtime();
    let mut app = app(&rt);
    handle_key(&mut app, key('r'));
    assert_eq!(app.in_flight, 0);
    let last = app.last_result.as_ref().unwrap();
    assert_eq!(last.kind, EntryKind::Error);
    assert!(last.lines[0].contains("no gateway selected"));
}

#[test]
fn confirm_modal_answers_yes_and_no() {
    let rt = runtime();
    let mut app = app(&rt);

    let (tx, mut rx) = oneshot::channel();
    app.apply_event(UiEvent::Ask {
        title: "Reset".into(),
        question: "Restart gateway gw1?".into(),
        reply: tx,
    });
    assert!(matches!(
        app.modal.as_ref().map(|m| &m.kind),
        Some(ModalKind::Confirm { .. })
    ));
    handle_key(&mut app, key('y'));
    assert_eq!(rx.try_recv().unwrap(), true);
    assert!(app.modal.is_none());

    let (tx, mut rx) = oneshot::channel();
    app.apply_event(UiEvent::Ask {
        title: "Forget".into(),
        question: "Forget gateway gw1?".into(),
        reply: tx,
    });
    handle_key(&mut app, code(KeyCode::Esc));
    assert_eq!(rx.try_recv().unwrap(), false);
}

#[test]
fn dialogs_queue_behind_open_modal() {
    let rt = runtime();
    let mut app = app(&rt);
    let (tx1, mut rx1) = oneshot::channel();
    let (tx2, mut rx2) = oneshot::channel();
    app.apply_event(UiEvent::Ask {
        title: "Reset".into(),
        question: "first".into(),
        reply: tx1,
    });
    app.apply_event(UiEvent::Ask {
        title: "Rescan".into(),
        question: "second".into(),
        reply: tx2,
    });
    assert_eq!(app.deferred.len(), 1);

    handle_key(&mut app, key('n'));
    assert_eq!(rx1.try_recv().unwrap(), false);
    assert_eq!(app.modal.as_ref().unwrap().lines, vec!["second"]);
    assert!(rx2.try_recv().is_err());

    handle_key(&mut app, key('y'));
    assert_eq!(rx2.try_recv().unwrap(), true);
    assert!(app.modal.is_none());
}

#[test]
fn prompt_modal_returns_typed_text_or_none() {
    let rt = runtime();
    let mut app = app(&rt);

    let (tx, mut rx) = oneshot::channel();
    app.apply_event(UiEvent::Prompt {
        question: "Send command to gateway gw1?".into(),
        label: "Command".into(),
        reply: tx,
    });
    for c in "ls -l".chars() {
        handle_key(&mut app, key(c));
    }
    handle_key(&mut app, code(KeyCode::Enter));
    assert_eq!(rx.try_recv().unwrap(), Some("ls -l".to_string()));

    let (tx, mut rx) = oneshot::channel();
    app.apply_event(UiEvent::Prompt {
        question: "Send command to gateway gw1?".into(),
        label: "Command".into(),
        reply: tx,
    });
    handle_key(&mut app, key('x'));
    handle_key(&mut app, code(KeyCode::Esc));
    assert_eq!(rx.try_recv().unwrap(), None);
}

#[test]
fn configure_modal_stays_open_until_text_parses() {
    let rt = runtime();
    let mut app = app(&rt);
    let (tx, mut rx) = oneshot::channel();
    app.apply_event(UiEvent::EditConfiguration {
        gateway: "gw1".into(),
        current: "{\"a\": 1".into(),
        reply: tx,
    });

    let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
    handle_key(&mut app, save);
    assert!(rx.try_recv().is_err());
    match app.modal.as_ref().map(|m| &m.kind) {
        Some(ModalKind::Configure { editor, .. }) => assert!(editor.message().is_some()),
        other => panic!("expected configure modal, got {:?}", other),
    }

    handle_key(&mut app, code(KeyCode::End));
    handle_key(&mut app, key('}'));
    handle_key(&mut app, save);
    assert_eq!(rx.try_recv().unwrap(), Some("{\"a\": 1}".to_string()));
    assert!(app.modal.is_none());
}

#[test]
fn closing_modal_without_answer_cancels() {
    let rt = runtime();
    let mut app = app(&rt);
    let (tx, mut rx) = oneshot::channel();
    app.apply_event(UiEvent::Ask {
        title: "Upgrade".into(),
        question: "Upgrade software on gateway gw1?".into(),
        reply: tx,
    });
    app.close_modal();
    assert!(matches!(
        rx.try_recv(),
        Err(oneshot::error::TryRecvError::Closed)
    ));
}

#[test]
fn declined_action_is_reported_as_cancelled() {
    let rt = runtime();
    let mut app = app(&rt);
    app.apply_event(UiEvent::Snapshot(snapshot(1, &[("gw1", 1)])));
    handle_key(&mut app, code(KeyCode::Down));

    handle_key(&mut app, key('r'));
    assert_eq!(app.in_flight, 1);
    wait_until(&mut app, |app| app.modal.is_some());
    assert_eq!(app.modal.as_ref().unwrap().title, "Reset");

    handle_key(&mut app, key('n'));
    wait_until(&mut app, |app| app.in_flight == 0);
    let last = app.last_result.as_ref().unwrap();
    assert_eq!(last.kind, EntryKind::Output);
    assert!(last.lines[0].contains("cancelled"));
}

#[test]
fn failed_command_lands_in_status_panel() {
    let rt = runtime();
    let mut app = app(&rt);
    app.apply_event(UiEvent::Snapshot(snapshot(1, &[("gw1", 1)])));
    handle_key(&mut app, code(KeyCode::Down));

    // Log needs no confirmation and goes straight to the (unreachable) backend.
    handle_key(&mut app, key('l'));
    wait_until(&mut app, |app| app.in_flight == 0);
    let last = app.last_result.as_ref().unwrap();
    assert_eq!(last.kind, EntryKind::Error);
    assert!(last.lines[0].starts_with("log on gw1 failed"));
}

#[test]
fn download_shows_resolved_software_url() {
    let rt = runtime();
    let mut app = app(&rt);
    handle_key(&mut app, key('d'));
    assert_eq!(app.last_result.as_ref().unwrap().kind, EntryKind::Error);

    let mut snap = snapshot(1, &[]);
    snap.software_url = Some("/meterman/download/metermon".into());
    app.apply_event(UiEvent::Snapshot(snap));
    handle_key(&mut app, key('d'));
    let modal = app.modal.as_ref().unwrap();
    assert_eq!(
        modal.lines,
        vec!["http://127.0.0.1:9/meterman/download/metermon"]
    );
}

#[test]
fn session_log_keeps_only_the_newest_entries() {
    let rt = runtime();
    let mut app = app(&rt);
    for i in 0..LOG_LIMIT + 25 {
        app.push_output(vec![format!("entry {}", i)]);
    }

    assert_eq!(app.log.len(), LOG_LIMIT);
    assert_eq!(app.log[0].lines, ["entry 25"]);
    let last = format!("entry {}", LOG_LIMIT + 24);
    assert_eq!(app.log[LOG_LIMIT - 1].lines, [last.clone()]);
    assert_eq!(app.last_result.as_ref().unwrap().lines, [last]);
}
