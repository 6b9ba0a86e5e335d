//! Configuration schema definitions.
//!
//! This module defines the explicit override map accepted at construction
//! and the fixed-field projection handed to other processes.
//! All types derive Serde traits so overrides can come from a TOML file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DST_PORT: u16 = 80;
pub const DEFAULT_HTTP_PORT: u16 = 20559;
pub const DEFAULT_DNS_PORT: u16 = 20560;
pub const DEFAULT_TIMEOUT_SECS: u64 = 900;
pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_DOMAIN: &str = "dev";

/// A domain list given either as `"dev,test"` or as `["dev", "test"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DomainList {
    Delimited(String),
    List(Vec<String>),
}

impl DomainList {
    /// Normalize to an ordered list of trimmed, non-empty names. Leading and
    /// trailing dots are dropped, so `dev.` and `dev` are the same domain.
    pub fn normalize(&self) -> Vec<String> {
        match self {
            DomainList::Delimited(s) => normalize_items(s.split(',')),
            DomainList::List(items) => normalize_items(items.iter().map(String::as_str)),
        }
    }
}

fn normalize_items<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(|s| s.trim().trim_matches('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<&str> for DomainList {
    fn from(s: &str) -> Self {
        DomainList::Delimited(s.to_string())
    }
}

impl From<Vec<String>> for DomainList {
    fn from(items: Vec<String>) -> Self {
        DomainList::List(items)
    }
}

/// Explicit overrides. Any field left unset falls through to the
/// environment, then to the built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// Path to the `pow` executable.
    pub bin: Option<PathBuf>,

    /// Public port that traffic is redirected from.
    pub dst_port: Option<u16>,

    pub http_port: Option<u16>,

    pub dns_port: Option<u16>,

    /// Idle timeout for application workers, in seconds.
    pub timeout: Option<u64>,

    /// Maximum workers per application.
    pub workers: Option<usize>,

    /// Domains answered over DNS and HTTP.
    pub domains: Option<DomainList>,

    /// Extra domains answered over HTTP only.
    pub ext_domains: Option<DomainList>,

    pub host_root: Option<PathBuf>,

    pub log_root: Option<PathBuf>,

    pub rvm_path: Option<PathBuf>,
}

/// Fixed-field projection of a resolved configuration.
///
/// Key names are stable; status reporters on the other side of a process
/// boundary depend on them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub bin: PathBuf,
    pub dst_port: u16,
    pub http_port: u16,
    pub dns_port: u16,
    pub timeout: u64,
    pub workers: usize,
    pub domains: Vec<String>,
    pub ext_domains: Vec<String>,
    pub host_root: PathBuf,
    pub log_root: PathBuf,
    pub rvm_path: PathBuf,
}
