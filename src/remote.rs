use std::path::Path;

use anyhow::{Context, Result};

use crate::dispatch::CommandSink;
use crate::model::{SeqToken, Snapshot};
use crate::sync::{PollOutcome, StateSource};

// Backend seqs start at 0 and only grow.
const UNSEEN_SEQ: &str = "-1";

mod download;
mod http_client;

pub use self::http_client::RemoteError;

/// HTTP client for the meterman backend.
#[derive(Clone, Debug)]
pub struct MetermanClient {
    base_url: String,
    client: reqwest::Client,
}

impl MetermanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("meterman")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One state query. `304` means nothing changed since `seq`.
    pub async fn poll_state(&self, seq: &SeqToken) -> Result<PollOutcome> {
        let resp = self
            .client
            .get(self.url("/meterman/state"))
            .query(&[("seq", seq.as_str())])
            .send()
            .await
            .context("state query")?;

        if resp.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(PollOutcome::NotModified);
        }
        let resp = self.ensure_ok(resp, "state query")?;
        let snapshot: Snapshot = resp.json().await.context("parse state")?;
        Ok(PollOutcome::Changed(snapshot))
    }

    /// The current state without waiting for a change. Asks with a token no
    /// backend state carries, so the answer comes back at once.
    pub async fn fetch_current(&self) -> Result<Snapshot> {
        let unseen = SeqToken::new(UNSEEN_SEQ);
        loop {
            match self.poll_state(&unseen).await? {
                PollOutcome::Changed(snapshot) => return Ok(snapshot),
                PollOutcome::NotModified => {
                    tracing::debug!("304 for an unseen seq; asking again")
                }
            }
        }
    }

    /// Posts a command for a gateway. The body, when present, goes out as
    /// plain text; the response body is ignored.
    pub async fn post_command(
        &self,
        gateway_id: &str,
        endpoint: &str,
        body: Option<String>,
    ) -> Result<()> {
        let mut req = self
            .client
            .post(self.url(&format!("/meterman/{}", endpoint)))
            .query(&[("gw", gateway_id)]);
        if let Some(body) = body {
            req = req
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(body);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("POST {}", endpoint))?;
        self.ensure_ok(resp, endpoint)?;
        Ok(())
    }

    /// Downloads the software reference of a snapshot into `dest`.
    pub async fn download_software(&self, snapshot: &Snapshot, dest: &Path) -> Result<u64> {
        let reference = snapshot
            .software_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("backend does not advertise a software download")?;
        self.download(reference, dest).await
    }
}

impl StateSource for MetermanClient {
    fn fetch_state(
        &self,
        seq: &SeqToken,
    ) -> impl std::future::Future<Output = Result<PollOutcome>> + Send {
        self.poll_state(seq)
    }
}

impl CommandSink for MetermanClient {
    fn send_command(
        &self,
        gateway_id: &str,
        endpoint: &str,
        body: Option<String>,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        self.post_command(gateway_id, endpoint, body)
    }
}
