//! `safebrowse classify <url>...` – score URLs with the loaded model.

use anyhow::Result;
use safebrowse_core::config::SafebrowseConfig;
use safebrowse_core::policy::{Outcome, VerdictSource};
use safebrowse_core::service::ClassifierService;
use std::path::Path;

use super::ready_service;

pub async fn run_classify(
    cfg: &SafebrowseConfig,
    model: Option<&Path>,
    urls: &[String],
    json: bool,
) -> Result<()> {
    let svc = ready_service(cfg, model).await?;
    classify_all(&svc, urls.iter().map(String::as_str), json)
}

/// Classify each URL (request ids are 1-based positions) and print the outcomes.
pub(super) fn classify_all<'a>(
    svc: &ClassifierService,
    urls: impl Iterator<Item = &'a str>,
    json: bool,
) -> Result<()> {
    if !json {
        println!("{:<8} {:<8} {:<5} {}", "SCORE", "RISK", "WARN", "URL");
    }
    for (i, url) in urls.enumerate() {
        let outcome = svc.handle(&(i + 1).to_string(), url);
        if json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            print_row(&outcome);
        }
    }
    Ok(())
}

fn print_row(outcome: &Outcome) {
    match outcome {
        Outcome::Verdict(v) => {
            let risk = match &v.source {
                VerdictSource::AllowListed { .. } => "allowed",
                VerdictSource::Model { .. } => v.risk.label(),
            };
            println!(
                "{:<8.3} {:<8} {:<5} {}",
                v.score,
                risk,
                if v.warn { "yes" } else { "no" },
                v.url
            );
        }
        Outcome::Skipped { url, reason } => {
            println!("{:<8} {:<8} {:<5} {}", "-", "skipped", "-", url);
            tracing::debug!(url, ?reason, "not scored");
        }
    }
}
