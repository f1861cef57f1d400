//! Boosted-tree phishing model: artifact loading, validation and scoring.
//!
//! The artifact is parsed once into an immutable [`Model`]. Everything that
//! can be checked up front is checked here (scaler shape, feature indices,
//! decision types) so a loaded model can only misbehave through the per-tree
//! faults reported by [`TreeEnsemble::predict`].

mod parse;
mod predict;
mod tree;

pub use predict::{predict, sigmoid, Prediction, Side, TreeFault};
pub use tree::{DecisionTree, Node, NodeId, TreeEnsemble, TreeError};

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::features::FEATURE_COUNT;
use crate::scaler::{ScalerError, ScalerParameters};
use parse::ModelDocument;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model scaler: {0}")]
    Scaler(#[from] ScalerError),
    #[error("model has no trees")]
    NoTrees,
    #[error("tree {tree}: {source}")]
    Tree {
        tree: usize,
        #[source]
        source: TreeError,
    },
    #[error("tree {tree} splits on feature {feature}; extractor only has {}", FEATURE_COUNT)]
    FeatureOutOfRange { tree: usize, feature: usize },
    #[error("tree {tree} uses unsupported decision type {decision_type:?}")]
    UnsupportedDecision { tree: usize, decision_type: String },
    #[error("model was trained on {trained} features, extractor produces {}", FEATURE_COUNT)]
    FeatureCountMismatch { trained: usize },
}

/// Immutable, validated model.
#[derive(Debug, Clone)]
pub struct Model {
    ensemble: TreeEnsemble,
    scaler: ScalerParameters,
    fingerprint: Option<String>,
    source: Option<PathBuf>,
}

/// Shape of a loaded model, for logs and `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub trees: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub incomplete_splits: usize,
    pub features: usize,
    pub fingerprint: Option<String>,
    pub source: Option<PathBuf>,
}

impl Model {
    /// Build a model from parts, checking scaler shape and feature indices.
    pub fn new(ensemble: TreeEnsemble, scaler: ScalerParameters) -> Result<Self, ModelError> {
        if scaler.len() != FEATURE_COUNT {
            return Err(ScalerError::DimensionMismatch {
                expected: FEATURE_COUNT,
                found: scaler.len(),
            }
            .into());
        }
        if ensemble.is_empty() {
            return Err(ModelError::NoTrees);
        }
        for (tree, t) in ensemble.trees().iter().enumerate() {
            if let Some(feature) = t.max_feature().filter(|&f| f >= FEATURE_COUNT) {
                return Err(ModelError::FeatureOutOfRange { tree, feature });
            }
        }
        Ok(Self {
            ensemble,
            scaler,
            fingerprint: None,
            source: None,
        })
    }

    /// Model built without the checks in [`Model::new`].
    #[cfg(test)]
    pub(crate) fn unchecked(ensemble: TreeEnsemble, scaler: ScalerParameters) -> Self {
        Self {
            ensemble,
            scaler,
            fingerprint: None,
            source: None,
        }
    }

    /// Parse an artifact held in memory.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let doc: ModelDocument = serde_json::from_slice(bytes)?;

        if let Some(max_idx) = doc.model.max_feature_idx {
            if max_idx != FEATURE_COUNT - 1 {
                return Err(ModelError::FeatureCountMismatch {
                    trained: max_idx.saturating_add(1),
                });
            }
        }
        if let Some(objective) = doc.model.objective.as_deref() {
            if !objective.starts_with("binary") {
                tracing::warn!(objective, "model objective is not binary; scores may not be probabilities");
            }
        }

        let mut trees = Vec::with_capacity(doc.model.tree_info.len());
        for (tree, info) in doc.model.tree_info.into_iter().enumerate() {
            if let Some(d) = info.tree_structure.unsupported_decision() {
                return Err(ModelError::UnsupportedDecision {
                    tree,
                    decision_type: d.to_string(),
                });
            }
            let t = info
                .tree_structure
                .into_tree()
                .map_err(|source| ModelError::Tree { tree, source })?;
            if t.incomplete_splits() > 0 {
                tracing::warn!(tree, splits = t.incomplete_splits(), "tree has splits with missing children");
            }
            trees.push(t);
        }

        let scaler = ScalerParameters::new(doc.scaler_mean, doc.scaler_scale)?;
        let mut model = Self::new(TreeEnsemble::new(trees), scaler)?;
        model.fingerprint = Some(hex::encode(Sha256::digest(bytes)));
        Ok(model)
    }

    /// Load an artifact from disk (blocking).
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes).map(|m| m.with_source(path))
    }

    /// Load an artifact from disk without blocking the runtime on I/O.
    pub async fn load_async(path: &Path) -> Result<Self, ModelError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes).map(|m| m.with_source(path))
    }

    fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn ensemble(&self) -> &TreeEnsemble {
        &self.ensemble
    }

    pub fn scaler(&self) -> &ScalerParameters {
        &self.scaler
    }

    /// Lowercase hex SHA-256 of the artifact bytes, if loaded from an artifact.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn summary(&self) -> ModelSummary {
        let trees = self.ensemble.trees();
        ModelSummary {
            trees: trees.len(),
            nodes: trees.iter().map(|t| t.nodes().len()).sum(),
            leaves: trees.iter().map(|t| t.leaf_count()).sum(),
            max_depth: trees.iter().map(|t| t.depth()).max().unwrap_or(0),
            incomplete_splits: trees.iter().map(|t| t.incomplete_splits()).sum(),
            features: self.scaler.len(),
            fingerprint: self.fingerprint.clone(),
            source: self.source.clone(),
        }
    }
}
