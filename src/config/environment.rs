//! Explicit environment variable maps.
//!
//! # Responsibilities
//! - Capture the process environment once at boot
//! - Overlay variables produced by the user configuration script
//! - Serve option lookups during configuration resolution
//! - Hand the merged map to whatever component spawns child processes
//!
//! # Design Decisions
//! - The process-wide environment is never mutated
//! - Lookups go through this map only, so resolution is reproducible in tests

use std::collections::BTreeMap;
use std::path::PathBuf;

/// An ordered set of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are dropped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Build an environment from explicit pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Return the first of `names` that is set.
    pub fn get_any(&self, names: &[&'static str]) -> Option<(&'static str, &str)> {
        names
            .iter()
            .find_map(|name| self.get(name).map(|v| (*name, v)))
    }

    /// Overlay `other` on top of this environment.
    pub fn merged(mut self, other: &BTreeMap<String, String>) -> Self {
        for (k, v) in other {
            self.vars.insert(k.clone(), v.clone());
        }
        self
    }

    /// The user's home directory: `HOME` if set, else the platform default.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get("HOME").map(PathBuf::from).or_else(dirs::home_dir)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
