use super::*;

impl MetermanClient {
    pub async fn download(&self, reference: &str, dest: &Path) -> Result<u64> {
        let url = self.resolve_url(reference);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        let resp = self.ensure_ok(resp, "download")?;
        let bytes = resp.bytes().await.context("read download body")?;

        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("write {}", dest.display()))?;
        tracing::info!(
            url = %url,
            bytes = bytes.len(),
            dest = %dest.display(),
            "downloaded software"
        );
        Ok(bytes.len() as u64)
    }
}
