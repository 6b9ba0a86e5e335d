//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Hand out per-name log handles rooted at the log directory
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`
//! - Handles are created lazily and returned idempotently per name;
//!   writing to the destination is the caller's concern

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `default_filter` applies when `RUST_LOG`
/// is unset or invalid.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// A named log destination.
#[derive(Debug, PartialEq, Eq)]
pub struct LogHandle {
    name: String,
    path: PathBuf,
}

impl LogHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File this handle writes to: `<log root>/<name>.log`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A span that tags events with this log's name.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("log", name = %self.name)
    }
}

/// Lazily populated map of log name to handle.
#[derive(Debug)]
pub struct LoggerRegistry {
    root: PathBuf,
    handles: DashMap<String, Arc<LogHandle>>,
}

impl LoggerRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handles: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the handle for `name`, creating it on first use.
    pub fn get_logger(&self, name: &str) -> Arc<LogHandle> {
        self.handles
            .entry(name.to_string())
            .or_insert_with(|| {
                let path = self.root.join(format!("{}.log", name));
                tracing::debug!(name, path = %path.display(), "Created log handle");
                Arc::new(LogHandle {
                    name: name.to_string(),
                    path,
                })
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
