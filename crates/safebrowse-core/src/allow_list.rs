//! Pre-vetted domains that bypass model scoring.

use std::collections::BTreeSet;

/// Domains shipped as the default allow-list.
pub const DEFAULT_SAFE_DOMAINS: [&str; 20] = [
    "google.com",
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "amazon.com",
    "ebay.com",
    "wikipedia.org",
    "reddit.com",
    "github.com",
    "stackoverflow.com",
    "microsoft.com",
    "apple.com",
    "netflix.com",
    "yahoo.com",
    "bing.com",
    "paypal.com",
    "dropbox.com",
    "zoom.us",
];

/// Immutable set of allow-listed domain suffixes.
///
/// A host matches an entry when it equals the entry or ends with `.entry`,
/// so `mail.google.com` matches `google.com` but `evilgoogle.com` does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    domains: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SAFE_DOMAINS)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// The allow-list entry matching `host`, if any.
    pub fn matching_entry(&self, host: &str) -> Option<&str> {
        let host = normalize_host(host);
        if host.is_empty() {
            return None;
        }
        self.domains
            .iter()
            .find(|entry| {
                host == entry.as_str()
                    || (host.len() > entry.len()
                        && host.ends_with(entry.as_str())
                        && host.as_bytes()[host.len() - entry.len() - 1] == b'.')
            })
            .map(String::as_str)
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.matching_entry(host).is_some()
    }
}

/// Lower-case, drop a trailing root dot, and strip one leading `www.` label.
pub fn normalize_host(host: &str) -> String {
    let lower = host.trim_end_matches('.').to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_suffix_matches() {
        let list = AllowList::with_defaults();
        assert!(list.contains_host("google.com"));
        assert!(list.contains_host("www.google.com"));
        assert!(list.contains_host("mail.google.com"));
        assert!(list.contains_host("WWW.GitHub.COM"));
        assert_eq!(list.matching_entry("docs.github.com"), Some("github.com"));
    }

    #[test]
    fn suffix_must_respect_label_boundary() {
        let list = AllowList::with_defaults();
        assert!(!list.contains_host("evilgoogle.com"));
        assert!(!list.contains_host("google.com.evil.ru"));
        assert!(!list.contains_host("paypal.com-login.example"));
    }

    #[test]
    fn empty_host_never_matches() {
        assert!(!AllowList::with_defaults().contains_host(""));
        assert!(!AllowList::with_defaults().contains_host("www."));
    }

    #[test]
    fn entries_are_normalized() {
        let list = AllowList::new(["  Example.ORG. ", "", "."]);
        assert_eq!(list.len(), 1);
        assert!(list.contains_host("shop.example.org"));
    }

    #[test]
    fn normalize_strips_one_www_label() {
        assert_eq!(normalize_host("www.Example.com."), "example.com");
        assert_eq!(normalize_host("www.www.example.com"), "www.example.com");
        assert_eq!(normalize_host("wwwexample.com"), "wwwexample.com");
    }
}
