//! Hostname decomposition and the IPv4-literal heuristic.

/// Label-based split of a hostname into subdomain, domain and TLD.
///
/// This is not public-suffix aware: `example.co.uk` yields domain `co`
/// and TLD `uk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub tld: String,
}

impl DomainParts {
    /// Split a (lower-cased) hostname on `.`.
    pub fn split(host: &str) -> Self {
        let labels: Vec<&str> = host.split('.').collect();
        match labels.len() {
            0 | 1 => Self {
                subdomain: String::new(),
                domain: host.to_string(),
                tld: host.to_string(),
            },
            2 => Self {
                subdomain: String::new(),
                domain: labels[0].to_string(),
                tld: labels[1].to_string(),
            },
            n => Self {
                subdomain: labels[..n - 2].join("."),
                domain: labels[n - 2].to_string(),
                tld: labels[n - 1].to_string(),
            },
        }
    }
}

/// True if `host` is non-empty and made only of ASCII digits and dots.
///
/// Coarse: octet ranges are not checked and IPv6 literals never match.
pub fn looks_like_ipv4(host: &str) -> bool {
    !host.is_empty() && host.chars().all(|c| c.is_ascii_digit() || c == '.')
}
