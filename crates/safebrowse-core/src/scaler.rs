//! Standardization of feature vectors with the training-time scaler.

use serde::Serialize;

use crate::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalerError {
    #[error("scaler has {found} parameters, extractor produces {expected} features")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("scaler mean has {mean} entries but scale has {scale}")]
    LengthMismatch { mean: usize, scale: usize },
    #[error("scaler scale[{index}] is {value}; every scale must be finite and non-zero")]
    InvalidScale { index: usize, value: f64 },
    #[error("scaler mean[{index}] is not finite")]
    InvalidMean { index: usize },
}

/// Per-feature mean and scale, index-aligned with the feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalerParameters {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl ScalerParameters {
    /// Validates equal lengths, finite means, and finite non-zero scales.
    /// The length is checked against the extractor in [`scale`].
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ScalerError> {
        if mean.len() != scale.len() {
            return Err(ScalerError::LengthMismatch {
                mean: mean.len(),
                scale: scale.len(),
            });
        }
        if let Some(index) = mean.iter().position(|m| !m.is_finite()) {
            return Err(ScalerError::InvalidMean { index });
        }
        if let Some((index, &value)) = scale
            .iter()
            .enumerate()
            .find(|(_, s)| **s == 0.0 || !s.is_finite())
        {
            return Err(ScalerError::InvalidScale { index, value });
        }
        Ok(Self { mean, scale })
    }

    /// Identity transform (mean 0, scale 1) for every feature.
    pub fn identity() -> Self {
        Self {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

/// Standardized feature vector fed to the tree ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledVector([f64; FEATURE_COUNT]);

impl ScaledVector {
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

/// `scaled[i] = (features[i] - mean[i]) / scale[i]`.
pub fn scale(features: &FeatureVector, params: &ScalerParameters) -> Result<ScaledVector, ScalerError> {
    if params.len() != FEATURE_COUNT {
        return Err(ScalerError::DimensionMismatch {
            expected: FEATURE_COUNT,
            found: params.len(),
        });
    }

    let mut out = [0.0f64; FEATURE_COUNT];
    for (i, (slot, value)) in out.iter_mut().zip(features.as_slice()).enumerate() {
        *slot = (value - params.mean[i]) / params.scale[i];
    }
    Ok(ScaledVector(out))
}
