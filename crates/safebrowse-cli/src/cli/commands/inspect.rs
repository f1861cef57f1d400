//! `safebrowse inspect` – summarize a model artifact.

use anyhow::{Context, Result};
use safebrowse_core::config::SafebrowseConfig;
use safebrowse_core::model::Model;
use std::path::Path;

use super::model_path;

pub async fn run_inspect(cfg: &SafebrowseConfig, model: Option<&Path>) -> Result<()> {
    let path = model_path(cfg, model)?;
    let model = Model::load_async(&path)
        .await
        .with_context(|| format!("load model {}", path.display()))?;
    let s = model.summary();

    println!("path:              {}", path.display());
    println!("sha256:            {}", s.fingerprint.as_deref().unwrap_or("-"));
    println!("trees:             {}", s.trees);
    println!("nodes:             {}", s.nodes);
    println!("leaves:            {}", s.leaves);
    println!("max depth:         {}", s.max_depth);
    println!("features:          {}", s.features);
    if s.incomplete_splits > 0 {
        println!("incomplete splits: {} (affected trees score 0 when reached)", s.incomplete_splits);
    }
    Ok(())
}
