//! CLI command handlers, one per file.

mod batch;
mod classify;
mod completions;
mod features;
mod inspect;

pub use batch::run_batch;
pub use classify::run_classify;
pub use completions::{run_completions, run_manpage};
pub use features::run_features;
pub use inspect::run_inspect;

use anyhow::{Context, Result};
use safebrowse_core::config::SafebrowseConfig;
use safebrowse_core::service::ClassifierService;
use safebrowse_core::sink::{LogNotifier, MemoryResultStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn model_path(cfg: &SafebrowseConfig, model: Option<&Path>) -> Result<PathBuf> {
    match model {
        Some(p) => Ok(p.to_path_buf()),
        None => cfg.resolved_model_path(),
    }
}

/// Build a service from config and load its model; without a model nothing can be scored.
async fn ready_service(cfg: &SafebrowseConfig, model: Option<&Path>) -> Result<ClassifierService> {
    let path = model_path(cfg, model)?;
    let svc = ClassifierService::from_config(
        cfg,
        Arc::new(MemoryResultStore::new()),
        Arc::new(LogNotifier),
    );
    svc.load_model(&path)
        .await
        .with_context(|| format!("model unavailable ({})", path.display()))?;
    Ok(svc)
}
