//! Long-lived classifier service.
//!
//! Owns the (possibly absent) model and the collaborators. Requests that
//! arrive before a model is installed are skipped immediately rather than
//! waiting for the load to finish.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::SafebrowseConfig;
use crate::model::{Model, ModelError, ModelSummary};
use crate::policy::{ClassificationPolicy, Outcome, SkipReason};
use crate::sink::{NotificationSink, ResultStore, Warning};

pub struct ClassifierService {
    policy: ClassificationPolicy,
    model: RwLock<Option<Arc<Model>>>,
    store: Arc<dyn ResultStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl ClassifierService {
    /// A service with no model: every request is skipped until one is installed.
    pub fn new(
        policy: ClassificationPolicy,
        store: Arc<dyn ResultStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            policy,
            model: RwLock::new(None),
            store,
            notifier,
        }
    }

    pub fn from_config(
        cfg: &SafebrowseConfig,
        store: Arc<dyn ResultStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::new(cfg.policy(), store, notifier)
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    /// Currently installed model, if any.
    pub fn model(&self) -> Option<Arc<Model>> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.model().is_some()
    }

    pub fn install_model(&self, model: Model) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(model));
    }

    /// Stop scoring until a model is installed again.
    pub fn disable_scoring(&self) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Load the artifact at `path` and install it.
    ///
    /// On failure the error is logged and returned; any previously installed
    /// model stays in place, and with none installed scoring stays disabled.
    pub async fn load_model(&self, path: &Path) -> Result<ModelSummary, ModelError> {
        match Model::load_async(path).await {
            Ok(model) => {
                let summary = model.summary();
                tracing::info!(
                    path = %path.display(),
                    trees = summary.trees,
                    nodes = summary.nodes,
                    fingerprint = summary.fingerprint.as_deref().unwrap_or("-"),
                    "model loaded"
                );
                self.install_model(model);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "model load failed; scoring disabled");
                Err(e)
            }
        }
    }

    /// Classify `url` for the request/session `request_id` and hand the
    /// result to the collaborators.
    pub fn handle(&self, request_id: &str, url: &str) -> Outcome {
        let Some(model) = self.model() else {
            tracing::debug!(request_id, "no model loaded; skipping");
            return Outcome::Skipped {
                url: url.to_string(),
                reason: SkipReason::ModelUnavailable,
            };
        };

        let outcome = self.policy.classify(url, &model);
        match &outcome {
            Outcome::Verdict(verdict) => {
                tracing::info!(request_id, score = verdict.score, risk = verdict.risk.label(), "classified");
                if verdict.warn {
                    self.notifier.notify(&Warning::from_verdict(verdict));
                }
                self.store.store(request_id, verdict);
            }
            Outcome::Skipped {
                reason: SkipReason::ModelIntegrity,
                ..
            } => {
                let mut slot = self.model.write().unwrap_or_else(PoisonError::into_inner);
                // Only drop the model that failed; a concurrent reload may have replaced it.
                if slot.as_ref().is_some_and(|m| Arc::ptr_eq(m, &model)) {
                    *slot = None;
                    tracing::error!(request_id, "model integrity fault; scoring disabled until reload");
                }
            }
            Outcome::Skipped { reason, .. } => {
                tracing::debug!(request_id, ?reason, "skipped");
            }
        }
        outcome
    }
}
