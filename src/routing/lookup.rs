//! Host to application lookup.
//!
//! # Responsibilities
//! - Generate candidate application names for a host under each domain
//! - Pick the first candidate present in the host root
//! - Fall back to the `default` application
//!
//! # Design Decisions
//! - Domain order outranks subdomain specificity across domains
//! - Within one domain, the most specific candidate wins
//! - The fallback reports the first configured domain, not the host's own
//! - "No match" is `None`, never an error

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Configuration;
use crate::observability::metrics;
use crate::roots::cache::RootSource;
use crate::roots::scanner::{ApplicationRoots, DirectoryError};

/// The application chosen for a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostMatch {
    /// Domain the host was matched under.
    pub domain: String,
    /// Directory of the application that serves it.
    pub root: PathBuf,
}

/// Candidate application names for `host` under `domain`, most specific
/// first.
///
/// `asset0.37s.basecamp.dev` under `dev` yields
/// `["asset0.37s.basecamp", "37s.basecamp", "basecamp"]`. A host that does
/// not end with `.domain` yields nothing.
pub fn candidates_for_host(host: &str, domain: &str) -> Vec<String> {
    let host = host.to_lowercase();
    let suffix = format!(".{}", domain.to_lowercase());

    let Some(prefix) = host.strip_suffix(suffix.as_str()) else {
        return Vec::new();
    };

    let labels: Vec<&str> = prefix.split('.').collect();
    (0..labels.len()).map(|i| labels[i..].join(".")).collect()
}

/// Find the application root for `host` given the configured `domains`.
pub fn find_application_root_for_host<S: AsRef<str>>(
    host: &str,
    domains: &[S],
    roots: &ApplicationRoots,
) -> Option<HostMatch> {
    resolve(host, domains, roots).map(|(found, _)| found)
}

/// Like `find_application_root_for_host`, also reporting whether the
/// `default` fallback was used.
fn resolve<S: AsRef<str>>(
    host: &str,
    domains: &[S],
    roots: &ApplicationRoots,
) -> Option<(HostMatch, bool)> {
    for domain in domains {
        let domain = domain.as_ref();
        for candidate in candidates_for_host(host, domain) {
            if let Some(root) = roots.get(&candidate) {
                let found = HostMatch {
                    domain: domain.to_string(),
                    root: root.to_path_buf(),
                };
                return Some((found, false));
            }
        }
    }

    let first = domains.first()?;
    roots.default_root().map(|root| {
        let found = HostMatch {
            domain: first.as_ref().to_string(),
            root: root.to_path_buf(),
        };
        (found, true)
    })
}

/// Resolves hosts against a configuration and a source of host-root
/// snapshots.
#[derive(Debug)]
pub struct HostLookup<S> {
    config: Arc<Configuration>,
    roots: S,
}

impl<S: RootSource> HostLookup<S> {
    pub fn new(config: Arc<Configuration>, roots: S) -> Self {
        Self { config, roots }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn roots(&self) -> &S {
        &self.roots
    }

    /// Look up `host` against every domain the HTTP side answers for.
    pub async fn lookup(&self, host: &str) -> Result<Option<HostMatch>, DirectoryError> {
        let roots = match self.roots.application_roots().await {
            Ok(roots) => roots,
            Err(e) => {
                metrics::record_lookup("error");
                return Err(e);
            }
        };

        match resolve(host, self.config.all_domains(), &roots) {
            Some((found, true)) => {
                metrics::record_lookup("default");
                tracing::debug!(host, root = %found.root.display(), "Falling back to default application");
                Ok(Some(found))
            }
            Some((found, false)) => {
                metrics::record_lookup("matched");
                tracing::debug!(host, domain = %found.domain, root = %found.root.display(), "Host matched");
                Ok(Some(found))
            }
            None => {
                metrics::record_lookup("none");
                tracing::debug!(host, "No application for host");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(entries: &[(&str, &str)]) -> ApplicationRoots {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_candidates_most_specific_first() {
        assert_eq!(
            candidates_for_host("asset0.37s.basecamp.dev", "dev"),
            vec!["asset0.37s.basecamp", "37s.basecamp", "basecamp"]
        );
        assert_eq!(candidates_for_host("MyApp.Dev", "dev"), vec!["myapp"]);
    }

    #[test]
    fn test_candidates_require_dot_suffix() {
        assert!(candidates_for_host("dev", "dev").is_empty());
        assert!(candidates_for_host("myappdev", "dev").is_empty());
        assert!(candidates_for_host("myapp.test", "dev").is_empty());
    }

    #[test]
    fn test_candidates_multi_label_domain() {
        assert_eq!(
            candidates_for_host("www.shop.lvh.me", "lvh.me"),
            vec!["www.shop", "shop"]
        );
    }

    #[test]
    fn test_subdomain_stripping() {
        let roots = roots(&[("basecamp", "/apps/basecamp")]);
        let found = find_application_root_for_host("asset0.37s.basecamp.dev", &["dev"], &roots);
        assert_eq!(
            found,
            Some(HostMatch {
                domain: "dev".into(),
                root: "/apps/basecamp".into(),
            })
        );
    }

    #[test]
    fn test_specificity_within_domain() {
        let roots = roots(&[("basecamp", "/apps/basecamp"), ("37s.basecamp", "/apps/37s")]);
        let found = find_application_root_for_host("asset0.37s.basecamp.dev", &["dev"], &roots).unwrap();
        assert_eq!(found.root, PathBuf::from("/apps/37s"));
    }

    #[test]
    fn test_domain_order_outranks_specificity() {
        // Host ends with both "b.test" and "test".
        let roots = roots(&[("a", "/apps/a"), ("x.a.b", "/apps/xab")]);
        let domains = ["b.test", "test"];

        let found = find_application_root_for_host("x.a.b.test", &domains, &roots).unwrap();
        assert_eq!(found.domain, "b.test");
        assert_eq!(found.root, PathBuf::from("/apps/a"));
    }

    #[test]
    fn test_default_fallback_uses_first_domain() {
        let roots = roots(&[("default", "/apps/default")]);
        let found = find_application_root_for_host("unknown.test", &["dev", "test"], &roots).unwrap();
        assert_eq!(found.domain, "dev");
        assert_eq!(found.root, PathBuf::from("/apps/default"));

        let found = find_application_root_for_host("example.com", &["dev", "test"], &roots).unwrap();
        assert_eq!(found.domain, "dev");
    }

    #[test]
    fn test_candidate_beats_default() {
        let roots = roots(&[("default", "/apps/default"), ("myapp", "/apps/myapp")]);

        let (found, is_default) = resolve("myapp.dev", &["dev"], &roots).unwrap();
        assert!(!is_default);
        assert_eq!(found.root, PathBuf::from("/apps/myapp"));

        let (found, is_default) = resolve("other.dev", &["dev"], &roots).unwrap();
        assert!(is_default);
        assert_eq!(found.root, PathBuf::from("/apps/default"));
    }

    #[test]
    fn test_second_domain_match_beats_default() {
        let roots = roots(&[("default", "/apps/default"), ("shop", "/apps/shop")]);
        let found = find_application_root_for_host("www.shop.test", &["dev", "test"], &roots).unwrap();
        assert_eq!(
            found,
            HostMatch {
                domain: "test".into(),
                root: "/apps/shop".into(),
            }
        );
    }

    #[test]
    fn test_no_match() {
        let roots = roots(&[("myapp", "/apps/myapp")]);
        assert_eq!(find_application_root_for_host("other.dev", &["dev"], &roots), None);
        assert_eq!(find_application_root_for_host("myapp.com", &["dev"], &roots), None);
    }

    #[test]
    fn test_no_domains_means_no_fallback() {
        let roots = roots(&[("default", "/apps/default")]);
        let domains: [&str; 0] = [];
        assert_eq!(find_application_root_for_host("myapp.dev", &domains, &roots), None);
    }
}
