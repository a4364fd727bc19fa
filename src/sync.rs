//! Long-poll synchronization with the backend's state endpoint.
//!
//! The engine keeps one query outstanding at a time. A "not modified" answer
//! is re-issued straight away (the backend holds the request open until
//! something changes), a changed sequence is adopted, a repeated sequence is
//! dropped, and any failure waits out a fixed backoff before the next query.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::model::{SeqToken, Snapshot};

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(30);

/// What the backend answered to one state query.
#[derive(Debug)]
pub enum PollOutcome {
    NotModified,
    Changed(Snapshot),
}

/// Something that answers state queries, normally the HTTP client.
pub trait StateSource {
    fn fetch_state(&self, seq: &SeqToken) -> impl Future<Output = Result<PollOutcome>> + Send;
}

/// The result of a single engine iteration.
#[derive(Debug)]
pub enum SyncStep {
    NotModified,
    Adopted(Snapshot),
    /// The body carried the sequence already held.
    Duplicate,
    /// The query failed; the backoff has already been waited out.
    Failed(anyhow::Error),
}

pub struct SyncEngine<S> {
    source: S,
    seq: SeqToken,
    backoff: Duration,
    min_interval: Duration,
}

impl<S: StateSource> SyncEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            seq: SeqToken::none(),
            backoff: DEFAULT_BACKOFF,
            min_interval: Duration::ZERO,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Lower bound between a "not modified" answer and the next query.
    /// Zero re-issues immediately.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// The sequence of the last adopted snapshot.
    pub fn seq(&self) -> &SeqToken {
        &self.seq
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn step(&mut self) -> SyncStep {
        match self.source.fetch_state(&self.seq).await {
            Ok(PollOutcome::NotModified) => {
                if !self.min_interval.is_zero() {
                    tokio::time::sleep(self.min_interval).await;
                }
                SyncStep::NotModified
            }
            Ok(PollOutcome::Changed(snapshot)) => {
                if snapshot.sequence == self.seq {
                    tracing::debug!(seq = %self.seq, "dropping snapshot with unchanged sequence");
                    return SyncStep::Duplicate;
                }
                tracing::debug!(
                    from = %self.seq,
                    to = %snapshot.sequence,
                    gateways = snapshot.gateways.len(),
                    "adopting snapshot"
                );
                self.seq = snapshot.sequence.clone();
                SyncStep::Adopted(snapshot)
            }
            Err(err) => {
                tracing::warn!(
                    seq = %self.seq,
                    backoff_secs = self.backoff.as_secs(),
                    "state query failed: {:#}",
                    err
                );
                tokio::time::sleep(self.backoff).await;
                SyncStep::Failed(err)
            }
        }
    }

    /// Runs until `shutdown` turns true (or its sender goes away), handing
    /// every adopted snapshot to `publish`.
    pub async fn run<F>(mut self, mut publish: F, mut shutdown: watch::Receiver<bool>)
    where
        F: FnMut(Snapshot),
    {
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            let step = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                step = self.step() => step,
            };
            if let SyncStep::Adopted(snapshot) = step {
                publish(snapshot);
            }
        }
        tracing::debug!(seq = %self.seq, "sync engine stopped");
    }
}

#[cfg(test)]
#[path = "tests/sync/engine_tests.rs"]
mod tests;
