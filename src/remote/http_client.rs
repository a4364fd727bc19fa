use super::*;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{label}: unexpected status {status}")]
    UnexpectedStatus {
        label: String,
        status: reqwest::StatusCode,
    },
}

impl MetermanClient {
    pub(super) fn ensure_ok(
        &self,
        resp: reqwest::Response,
        label: &str,
    ) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::UnexpectedStatus {
                label: label.to_string(),
                status,
            }
            .into());
        }
        Ok(resp)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves a backend-provided reference: absolute URLs are kept,
    /// anything else is taken relative to the base URL.
    pub fn resolve_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        if reference.starts_with('/') {
            self.url(reference)
        } else {
            format!("{}/{}", self.base_url, reference)
        }
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
