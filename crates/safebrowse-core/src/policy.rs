//! Classification policy: allow-list short-circuit, extract, scale, infer,
//! threshold.
//!
//! Every request ends in exactly one [`Outcome`]. A skipped request never
//! carries a score, so "not analysed" stays distinguishable from a genuine
//! 0.0 (allow-listed) verdict.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::allow_list::AllowList;
use crate::features;
use crate::model::{Model, TreeFault};
use crate::scaler;

/// Score above which a warning must be surfaced.
pub const DEFAULT_WARN_THRESHOLD: f64 = 0.5;

/// Schemes of browser-internal pages that are never analysed.
pub const DEFAULT_IGNORED_SCHEMES: [&str; 3] = ["chrome", "chrome-extension", "about"];

/// Coarse risk band shown to users.
///
/// Bands are fixed at 0.3 and 0.5 and do not follow the configured warning
/// threshold: with a raised threshold a `Danger` verdict may carry `warn == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Caution,
    Danger,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            RiskLevel::Safe
        } else if score < 0.5 {
            RiskLevel::Caution
        } else {
            RiskLevel::Danger
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Caution => "caution",
            RiskLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerdictSource {
    /// Host matched this allow-list entry; no inference was run.
    AllowListed { entry: String },
    /// Scored by the ensemble.
    Model { margin: f64, faults: Vec<TreeFault> },
}

/// Result of one classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub url: String,
    pub score: f64,
    /// Unix epoch milliseconds.
    pub timestamp_ms: u64,
    /// True when `score` exceeds the warning threshold.
    pub warn: bool,
    pub risk: RiskLevel,
    pub source: VerdictSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Input could not be parsed as a URL.
    MalformedUrl,
    /// Browser-internal page (e.g. `chrome://`).
    InternalPage,
    /// No model is loaded.
    ModelUnavailable,
    /// The model failed an integrity check while scoring; it must not be used.
    ModelIntegrity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Verdict(Verdict),
    Skipped { url: String, reason: SkipReason },
}

impl Outcome {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Outcome::Verdict(v) => Some(v),
            Outcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Outcome::Verdict(_) => None,
            Outcome::Skipped { reason, .. } => Some(*reason),
        }
    }
}

/// Allow-list, threshold and scheme filter applied to every request.
#[derive(Debug, Clone)]
pub struct ClassificationPolicy {
    allow_list: AllowList,
    warn_threshold: f64,
    ignored_schemes: Vec<String>,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(AllowList::with_defaults())
    }
}

impl ClassificationPolicy {
    pub fn new(allow_list: AllowList) -> Self {
        Self {
            allow_list,
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            ignored_schemes: DEFAULT_IGNORED_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_warn_threshold(mut self, threshold: f64) -> Self {
        self.warn_threshold = threshold;
        self
    }

    pub fn with_ignored_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_schemes = schemes
            .into_iter()
            .map(|s| s.into().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn warn_threshold(&self) -> f64 {
        self.warn_threshold
    }

    /// Classify `url` against `model`.
    pub fn classify(&self, url: &str, model: &Model) -> Outcome {
        let skipped = |reason| Outcome::Skipped {
            url: url.to_string(),
            reason,
        };

        let parsed = match Url::parse(url) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(url, error = %e, "skipping malformed URL");
                return skipped(SkipReason::MalformedUrl);
            }
        };
        if self.ignored_schemes.iter().any(|s| s == parsed.scheme()) {
            return skipped(SkipReason::InternalPage);
        }

        if let Some(entry) = parsed
            .host_str()
            .and_then(|host| self.allow_list.matching_entry(host))
        {
            tracing::debug!(url, entry, "allow-listed host");
            return Outcome::Verdict(self.verdict(
                url,
                0.0,
                VerdictSource::AllowListed {
                    entry: entry.to_string(),
                },
            ));
        }

        let features = match features::extract(url) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(error = %e, "feature extraction failed");
                return skipped(SkipReason::MalformedUrl);
            }
        };
        let scaled = match scaler::scale(&features, model.scaler()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "model scaler is unusable");
                return skipped(SkipReason::ModelIntegrity);
            }
        };
        let prediction = model.ensemble().predict(&scaled);

        Outcome::Verdict(self.verdict(
            url,
            prediction.probability,
            VerdictSource::Model {
                margin: prediction.margin,
                faults: prediction.faults,
            },
        ))
    }

    fn verdict(&self, url: &str, score: f64, source: VerdictSource) -> Verdict {
        Verdict {
            url: url.to_string(),
            score,
            timestamp_ms: now_millis(),
            warn: score > self.warn_threshold,
            risk: RiskLevel::from_score(score),
            source,
        }
    }
}

/// Classify with the default threshold and scheme filter.
pub fn classify(url: &str, model: &Model, allow_list: &AllowList) -> Outcome {
    ClassificationPolicy::new(allow_list.clone()).classify(url, model)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{feature_index, FEATURE_COUNT};
    use crate::model::{DecisionTree, TreeEnsemble};
    use crate::scaler::ScalerParameters;

    /// Two stumps on `count_hyphen` and `tld_len`, scaled so the example URL
    /// lands at 2.0 and 3.0 respectively.
    fn example_model() -> Model {
        let hyphen = feature_index("count_hyphen").unwrap();
        let tld = feature_index("tld_len").unwrap();
        let mut mean = vec![0.0; FEATURE_COUNT];
        mean[tld] = -1.0;
        let scaler = ScalerParameters::new(mean, vec![1.0; FEATURE_COUNT]).unwrap();
        let ensemble = TreeEnsemble::new(vec![
            DecisionTree::stump(hyphen, 1.5, -0.2, 0.8),
            DecisionTree::stump(tld, 2.5, -0.5, 1.3),
        ]);
        Model::new(ensemble, scaler).unwrap()
    }

    #[test]
    fn phishing_example_exceeds_threshold() {
        let model = example_model();
        let outcome = classify(
            "http://g00gle-secure-login.ru/update?id=12345",
            &model,
            &AllowList::with_defaults(),
        );
        let v = outcome.verdict().expect("verdict");
        match &v.source {
            VerdictSource::Model { margin, faults } => {
                assert!((margin - 2.1).abs() < 1e-12);
                assert!(faults.is_empty());
            }
            other => panic!("expected model verdict, got {other:?}"),
        }
        assert!((v.score - 0.8909).abs() < 1e-4);
        assert!(v.warn);
        assert_eq!(v.risk, RiskLevel::Danger);
    }

    #[test]
    fn allow_listed_host_scores_zero_without_inference() {
        let model = example_model();
        let outcome = classify(
            "https://www.google.com/?zx=1765289896187&no_sw_cr=1",
            &model,
            &AllowList::with_defaults(),
        );
        let v = outcome.verdict().expect("verdict");
        assert_eq!(v.score, 0.0);
        assert!(!v.warn);
        assert_eq!(v.risk, RiskLevel::Safe);
        assert_eq!(
            v.source,
            VerdictSource::AllowListed {
                entry: "google.com".to_string()
            }
        );
    }

    #[test]
    fn malformed_url_is_skipped() {
        let outcome = classify("not a url", &example_model(), &AllowList::default());
        assert_eq!(outcome.skip_reason(), Some(SkipReason::MalformedUrl));
        assert!(outcome.verdict().is_none());
    }

    #[test]
    fn internal_pages_are_skipped() {
        let policy = ClassificationPolicy::default();
        let model = example_model();
        for url in ["chrome://settings", "chrome-extension://abc/popup.html", "about:blank"] {
            assert_eq!(
                policy.classify(url, &model).skip_reason(),
                Some(SkipReason::InternalPage),
                "{url}"
            );
        }
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let model = example_model();
        let url = "http://g00gle-secure-login.ru/update?id=12345";
        let score = classify(url, &model, &AllowList::default())
            .verdict()
            .unwrap()
            .score;

        let at_score = ClassificationPolicy::new(AllowList::default()).with_warn_threshold(score);
        assert!(!at_score.classify(url, &model).verdict().unwrap().warn);

        let below = ClassificationPolicy::new(AllowList::default()).with_warn_threshold(score - 1e-9);
        assert!(below.classify(url, &model).verdict().unwrap().warn);
    }

    #[test]
    fn hyphen_free_url_takes_left_leaf() {
        let outcome = classify("https://example.org/docs", &example_model(), &AllowList::default());
        let v = outcome.verdict().unwrap();
        match &v.source {
            VerdictSource::Model { margin, .. } => {
                assert!((margin - 1.1).abs() < 1e-12);
                assert_eq!(v.score, crate::model::sigmoid(*margin));
            }
            other => panic!("expected model verdict, got {other:?}"),
        }
    }

    #[test]
    fn risk_band_ignores_warn_threshold() {
        let model = example_model();
        let url = "https://example.org/docs";
        let relaxed = ClassificationPolicy::new(AllowList::default()).with_warn_threshold(0.8);
        let v = relaxed.classify(url, &model).verdict().cloned().unwrap();
        assert!(v.score > 0.5 && v.score < 0.8);
        assert_eq!(v.risk, RiskLevel::Danger);
        assert!(!v.warn);
    }

    #[test]
    fn scaler_of_wrong_width_skips_as_integrity_fault() {
        let hyphen = feature_index("count_hyphen").unwrap();
        let scaler = ScalerParameters::new(vec![0.0; 17], vec![1.0; 17]).unwrap();
        let model = Model::unchecked(
            TreeEnsemble::new(vec![DecisionTree::stump(hyphen, 1.5, -0.2, 0.8)]),
            scaler,
        );
        let outcome = classify("http://g00gle-secure-login.ru/", &model, &AllowList::default());
        assert_eq!(outcome.skip_reason(), Some(SkipReason::ModelIntegrity));
    }

    #[test]
    fn risk_bands() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(0.29), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(0.49), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(0.5), RiskLevel::Danger);
    }
}
