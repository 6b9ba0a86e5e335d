//! Domain matching logic.
//!
//! # Responsibilities
//! - Decide whether a hostname belongs to a configured domain set
//! - Accept fully-qualified names with a trailing dot (DNS queries)
//!
//! # Design Decisions
//! - Case-insensitive (hostnames are)
//! - Domains are compared literally; no regex, so `.` or `*` in a
//!   configured domain has no special meaning
//! - Boolean only: choosing an application is `lookup`'s job

/// Compiled test for "does this hostname belong to one of these domains?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMatcher {
    domains: Vec<String>,
}

impl DomainMatcher {
    /// Compile a matcher over `domains`, keeping their order. Domains are
    /// expected already normalized (see `DomainList::normalize`).
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// True if `host` equals a domain or ends with `.` followed by one.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        let host = host.strip_suffix('.').unwrap_or(&host);

        self.domains.iter().any(|domain| {
            host.strip_suffix(domain.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
        })
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }
}
