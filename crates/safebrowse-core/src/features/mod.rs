//! Lexical URL features.
//!
//! Turns a URL string into the fixed-order numeric vector the boosted-tree
//! model was trained on. Character-class counts and entropy are taken over
//! the original input string; length and domain features over the parsed
//! components.

mod entropy;
mod host;

pub use entropy::shannon_entropy;
pub use host::{looks_like_ipv4, DomainParts};

use serde::Serialize;
use url::Url;

/// Number of features produced by the extractor.
pub const FEATURE_COUNT: usize = 18;

/// Feature names in vector order. Model artifacts are index-aligned to this.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "url_length",
    "host_length",
    "path_length",
    "query_length",
    "count_digits",
    "count_hyphen",
    "count_at",
    "count_percent",
    "count_question",
    "count_equals",
    "count_slash",
    "num_dots",
    "has_ip",
    "entropy",
    "tld_len",
    "subdomain_len",
    "domain_len",
    "uses_https",
];

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("malformed URL {url:?}: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Ordered, immutable numeric feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Iterate `(name, value)` pairs in vector order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

/// Named lexical features of one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlFeatures {
    pub url_length: usize,
    pub host_length: usize,
    pub path_length: usize,
    pub query_length: usize,
    pub count_digits: usize,
    pub count_hyphen: usize,
    pub count_at: usize,
    pub count_percent: usize,
    pub count_question: usize,
    pub count_equals: usize,
    pub count_slash: usize,
    pub num_dots: usize,
    pub has_ip: bool,
    pub entropy: f64,
    pub tld_len: usize,
    pub subdomain_len: usize,
    pub domain_len: usize,
    pub uses_https: bool,
}

impl UrlFeatures {
    /// Parse `url` and compute its features.
    pub fn from_url(url: &str) -> Result<Self, ExtractionError> {
        let parsed = Url::parse(url).map_err(|source| ExtractionError::MalformedUrl {
            url: url.to_string(),
            source,
        })?;

        let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();
        let parts = DomainParts::split(&host);

        let count = |target: char| url.chars().filter(|&c| c == target).count();

        Ok(Self {
            url_length: url.chars().count(),
            host_length: host.chars().count(),
            path_length: parsed.path().chars().count(),
            query_length: parsed.query().map(|q| q.chars().count()).unwrap_or(0),
            count_digits: url.chars().filter(|c| c.is_ascii_digit()).count(),
            count_hyphen: count('-'),
            count_at: count('@'),
            count_percent: count('%'),
            count_question: count('?'),
            count_equals: count('='),
            count_slash: count('/'),
            num_dots: count('.'),
            has_ip: looks_like_ipv4(&host),
            entropy: shannon_entropy(url),
            tld_len: parts.tld.chars().count(),
            subdomain_len: parts.subdomain.chars().count(),
            domain_len: parts.domain.chars().count(),
            uses_https: parsed.scheme() == "https",
        })
    }

    pub fn to_vector(&self) -> FeatureVector {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        FeatureVector([
            self.url_length as f64,
            self.host_length as f64,
            self.path_length as f64,
            self.query_length as f64,
            self.count_digits as f64,
            self.count_hyphen as f64,
            self.count_at as f64,
            self.count_percent as f64,
            self.count_question as f64,
            self.count_equals as f64,
            self.count_slash as f64,
            self.num_dots as f64,
            flag(self.has_ip),
            self.entropy,
            self.tld_len as f64,
            self.subdomain_len as f64,
            self.domain_len as f64,
            flag(self.uses_https),
        ])
    }
}

/// Extract the feature vector for `url`.
pub fn extract(url: &str) -> Result<FeatureVector, ExtractionError> {
    UrlFeatures::from_url(url).map(|f| f.to_vector())
}

/// Index of a named feature, if the name is known.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|&n| n == name)
}
