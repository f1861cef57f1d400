//! Collaborators that consume verdicts: a per-request result store and a
//! notification sink for warnings.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use crate::policy::Verdict;

/// Stores the latest verdict per request/session id (e.g. a browser tab).
pub trait ResultStore: Send + Sync {
    fn store(&self, request_id: &str, verdict: &Verdict);
}

/// Surfaces warnings for verdicts above the threshold.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, warning: &Warning);
}

/// Payload handed to a [`NotificationSink`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Warning {
    pub url: String,
    pub score: f64,
    pub message: String,
}

impl Warning {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        Self {
            url: verdict.url.clone(),
            score: verdict.score,
            message: format!(
                "This website may be dangerous!\nRisk Score: {:.1}%",
                verdict.score * 100.0
            ),
        }
    }
}

/// In-process result store keyed by request id. Later verdicts replace
/// earlier ones for the same id.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: RwLock<HashMap<String, Verdict>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, request_id: &str) -> Option<Verdict> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request_id)
            .cloned()
    }

    pub fn remove(&self, request_id: &str) -> Option<Verdict> {
        self.results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(request_id)
    }

    pub fn len(&self) -> usize {
        self.results.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryResultStore {
    fn store(&self, request_id: &str, verdict: &Verdict) {
        self.results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_id.to_string(), verdict.clone());
    }
}

/// Writes warnings to the operator log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, warning: &Warning) {
        tracing::warn!(url = %warning.url, score = warning.score, "phishing warning raised");
    }
}

/// Keeps every warning it receives, in order.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for CollectingNotifier {
    fn notify(&self, warning: &Warning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning.clone());
    }
}
