use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::time::Instant;

use super::*;
use crate::model::Gateway;
use crate::reconcile::ViewSink;
use crate::store::SnapshotStore;

/// Answers queries from a fixed script; once exhausted it behaves like a
/// long poll that never completes.
#[derive(Clone, Default)]
struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Result<PollOutcome>>>>,
    queries: Arc<Mutex<Vec<(SeqToken, Instant)>>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<PollOutcome>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            queries: Arc::default(),
        }
    }

    fn queries(&self) -> Vec<(SeqToken, Instant)> {
        self.queries.lock().unwrap().clone()
    }

    fn tokens(&self) -> Vec<String> {
        self.queries()
            .into_iter()
            .map(|(seq, _)| seq.as_str().to_string())
            .collect()
    }
}

impl StateSource for ScriptedSource {
    fn fetch_state(&self, seq: &SeqToken) -> impl Future<Output = Result<PollOutcome>> + Send {
        self.queries
            .lock()
            .unwrap()
            .push((seq.clone(), Instant::now()));
        let next = self.script.lock().unwrap().pop_front();
        async move {
            match next {
                Some(answer) => answer,
                None => std::future::pending().await,
            }
        }
    }
}

fn changed(seq: u64, ids: &[&str]) -> Result<PollOutcome> {
    Ok(PollOutcome::Changed(snapshot(seq, ids)))
}

fn snapshot(seq: u64, ids: &[&str]) -> Snapshot {
    Snapshot {
        sequence: SeqToken::from(seq),
        software_url: None,
        gateways: ids
            .iter()
            .map(|id| {
                let gw = Gateway {
                    up_since: Some(1000),
                    ..Gateway::new(*id)
                };
                (id.to_string(), gw)
            })
            .collect(),
    }
}

#[tokio::test(start_paused = true)]
async fn not_modified_requeries_immediately_with_same_token() {
    let source = ScriptedSource::new(vec![
        Ok(PollOutcome::NotModified),
        Ok(PollOutcome::NotModified),
    ]);
    let mut engine = SyncEngine::new(source.clone());

    assert!(matches!(engine.step().await, SyncStep::NotModified));
    assert!(matches!(engine.step().await, SyncStep::NotModified));

    let queries = source.queries();
    assert_eq!(source.tokens(), vec!["0", "0"]);
    assert_eq!(queries[1].1 - queries[0].1, Duration::ZERO);
    assert_eq!(engine.seq(), &SeqToken::none());
}

#[tokio::test(start_paused = true)]
async fn min_interval_spaces_out_not_modified_queries() {
    let source = ScriptedSource::new(vec![
        Ok(PollOutcome::NotModified),
        Ok(PollOutcome::NotModified),
    ]);
    let mut engine =
        SyncEngine::new(source.clone()).with_min_interval(Duration::from_millis(500));

    engine.step().await;
    engine.step().await;

    let queries = source.queries();
    assert_eq!(queries[1].1 - queries[0].1, Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn adopts_changed_sequences_and_drops_repeats() {
    let source = ScriptedSource::new(vec![
        changed(1, &["gw1"]),
        changed(1, &["gw1", "other"]),
        changed(2, &[]),
    ]);
    let mut engine = SyncEngine::new(source.clone());

    match engine.step().await {
        SyncStep::Adopted(s) => assert!(s.contains("gw1")),
        other => panic!("expected adoption, got {:?}", other),
    }
    assert!(matches!(engine.step().await, SyncStep::Duplicate));
    match engine.step().await {
        SyncStep::Adopted(s) => assert!(s.gateways.is_empty()),
        other => panic!("expected adoption, got {:?}", other),
    }

    assert_eq!(source.tokens(), vec!["0", "1", "1"]);
    assert_eq!(engine.seq(), &SeqToken::from(2));
}

#[tokio::test(start_paused = true)]
async fn failures_wait_out_backoff_and_keep_token() {
    let source = ScriptedSource::new(vec![
        changed(5, &["gw1"]),
        Err(anyhow!("connection refused")),
        Ok(PollOutcome::NotModified),
    ]);
    let mut engine = SyncEngine::new(source.clone());

    engine.step().await;
    assert!(matches!(engine.step().await, SyncStep::Failed(_)));
    engine.step().await;

    let queries = source.queries();
    assert_eq!(source.tokens(), vec!["0", "5", "5"]);
    assert_eq!(queries[2].1 - queries[1].1, DEFAULT_BACKOFF);
    assert_eq!(engine.seq(), &SeqToken::from(5));
}

#[tokio::test(start_paused = true)]
async fn run_publishes_adopted_snapshots_until_shutdown() {
    let source = ScriptedSource::new(vec![
        changed(1, &["gw1"]),
        Ok(PollOutcome::NotModified),
        changed(1, &["gw1"]),
        Err(anyhow!("502 bad gateway")),
        changed(2, &["gw2"]),
    ]);
    let engine = SyncEngine::new(source.clone());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(
        move |snapshot| {
            let _ = tx.send(snapshot);
        },
        stop_rx,
    ));

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.sequence, SeqToken::from(1));
    assert_eq!(second.sequence, SeqToken::from(2));

    stop_tx.send(true).unwrap();
    task.await.unwrap();
    assert!(rx.try_recv().is_err());
    assert_eq!(source.tokens(), vec!["0", "1", "1", "1", "1", "2"]);
}

#[derive(Default)]
struct CountingViews {
    list_renders: usize,
    detail_renders: usize,
    listed: Vec<String>,
    detail: Option<String>,
}

impl ViewSink for CountingViews {
    fn on_snapshot_changed(&mut self, snapshot: &Snapshot, _selected: Option<&str>) {
        self.list_renders += 1;
        self.listed = snapshot.gateways.keys().cloned().collect();
    }

    fn on_selection_changed(&mut self, gateway: Option<&Gateway>) {
        self.detail_renders += 1;
        self.detail = gateway.map(|g| g.id.clone());
    }
}

async fn pump(engine: &mut SyncEngine<ScriptedSource>, store: &mut SnapshotStore<CountingViews>) {
    if let SyncStep::Adopted(snapshot) = engine.step().await {
        store.replace_snapshot(snapshot);
    }
}

#[tokio::test(start_paused = true)]
async fn repeated_sequence_causes_no_rerender_and_removal_clears_detail() {
    let source = ScriptedSource::new(vec![
        changed(1, &["gw1"]),
        changed(1, &["gw1"]),
        changed(2, &[]),
    ]);
    let mut engine = SyncEngine::new(source);
    let mut store = SnapshotStore::new(CountingViews::default());

    pump(&mut engine, &mut store).await;
    assert_eq!(store.views().listed, vec!["gw1"]);
    store.select_gateway(Some("gw1"));
    assert_eq!(store.views().detail.as_deref(), Some("gw1"));
    let renders = (store.views().list_renders, store.views().detail_renders);

    pump(&mut engine, &mut store).await;
    assert_eq!(
        (store.views().list_renders, store.views().detail_renders),
        renders
    );

    pump(&mut engine, &mut store).await;
    assert!(store.views().listed.is_empty());
    assert!(store.views().detail.is_none());
    assert_eq!(store.selection(), None);
}
