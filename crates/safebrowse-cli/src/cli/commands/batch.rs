//! `safebrowse batch <file>` – classify a list of URLs.

use anyhow::{Context, Result};
use safebrowse_core::config::SafebrowseConfig;
use std::path::Path;

use super::classify::classify_all;
use super::ready_service;

/// URLs in `text`: trimmed, skipping blank lines and `#` comments.
fn parse_url_list(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

pub async fn run_batch(
    cfg: &SafebrowseConfig,
    model: Option<&Path>,
    path: &Path,
    json: bool,
) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read URL list {}", path.display()))?;
    let urls = parse_url_list(&text);
    tracing::info!(count = urls.len(), file = %path.display(), "batch classification");

    let svc = ready_service(cfg, model).await?;
    classify_all(&svc, urls.into_iter(), json)
}
