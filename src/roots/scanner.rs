//! Host-root directory scanning.
//!
//! # Responsibilities
//! - Ensure the host root exists
//! - Resolve each entry (symlink or directory) to an application root
//! - Build a case-insensitive name → path mapping
//!
//! # Design Decisions
//! - One future per entry, joined behind a single barrier
//! - Per-entry results are merged only after the barrier, so the map has
//!   exactly one writer
//! - Broken links, non-directories and unreadable entries are skipped, not
//!   reported; only failing to create or list the root is an error
//! - Names that collide case-insensitively resolve to the entry whose
//!   original name sorts first

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use futures_util::future::join_all;
use thiserror::Error;
use tokio::fs;

use crate::observability::metrics;

/// Name of the entry used when nothing else matches.
pub const DEFAULT_ENTRY: &str = "default";

/// The host root could not be prepared or read.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to create host root {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list host root {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Snapshot of the applications found in the host root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationRoots {
    roots: BTreeMap<String, PathBuf>,
}

impl ApplicationRoots {
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.roots.get(name).map(PathBuf::as_path)
    }

    /// The fallback application, if the host root has a `default` entry.
    pub fn default_root(&self) -> Option<&Path> {
        self.get(DEFAULT_ENTRY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.roots.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, PathBuf> {
        self.roots
    }
}

impl<K: Into<String>, V: Into<PathBuf>> FromIterator<(K, V)> for ApplicationRoots {
    /// Keys are lowercased; the first occurrence of a key wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut roots: BTreeMap<String, PathBuf> = BTreeMap::new();
        for (k, v) in iter {
            let key: String = k.into();
            roots.entry(key.to_lowercase()).or_insert_with(|| v.into());
        }
        Self { roots }
    }
}

/// A resolved entry, before collision handling.
#[derive(Debug)]
struct ScannedEntry {
    original: String,
    path: PathBuf,
}

/// Scans a host root for application directories.
#[derive(Debug, Clone)]
pub struct ApplicationRootResolver {
    root: PathBuf,
}

impl ApplicationRootResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the host root and return every resolvable application.
    pub async fn gather_application_roots(&self) -> Result<ApplicationRoots, DirectoryError> {
        let started = Instant::now();
        let result = self.scan().await;
        match &result {
            Ok((roots, skipped)) => {
                metrics::record_scan(roots.len(), *skipped, started.elapsed());
                tracing::debug!(
                    root = %self.root.display(),
                    applications = roots.len(),
                    skipped,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Host root scanned"
                );
            }
            Err(e) => {
                metrics::record_scan_failure();
                tracing::warn!(error = %e, "Host root scan failed");
            }
        }
        result.map(|(roots, _)| roots)
    }

    async fn scan(&self) -> Result<(ApplicationRoots, usize), DirectoryError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| DirectoryError::Create {
                path: self.root.clone(),
                source,
            })?;

        let names = self.list().await?;
        let total = names.len();

        // Fan out, one future per entry; nothing is merged until all finish.
        let scanned = join_all(names.into_iter().map(|name| self.resolve_entry(name))).await;

        let mut found: Vec<ScannedEntry> = scanned.into_iter().flatten().collect();
        let skipped = total - found.len();

        found.sort_by(|a, b| a.original.cmp(&b.original));
        let mut roots: BTreeMap<String, PathBuf> = BTreeMap::new();
        for entry in found {
            let key = entry.original.to_lowercase();
            match roots.get(&key) {
                Some(kept) => {
                    tracing::warn!(
                        name = %entry.original,
                        kept = %kept.display(),
                        ignored = %entry.path.display(),
                        "Host root entries collide case-insensitively"
                    );
                }
                None => {
                    roots.insert(key, entry.path);
                }
            }
        }

        Ok((ApplicationRoots { roots }, skipped))
    }

    async fn list(&self) -> Result<Vec<OsString>, DirectoryError> {
        let list_error = |source| DirectoryError::List {
            path: self.root.clone(),
            source,
        };

        let mut dir = fs::read_dir(&self.root).await.map_err(list_error)?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(list_error)? {
            names.push(entry.file_name());
        }
        Ok(names)
    }

    async fn resolve_entry(&self, name: OsString) -> Option<ScannedEntry> {
        let path = self.root.join(&name);
        let Some(original) = name.to_str().map(str::to_string) else {
            tracing::debug!(path = %path.display(), "Skipping entry with non-UTF-8 name");
            return None;
        };

        match resolve_application_dir(&path).await {
            Ok(Some(resolved)) => Some(ScannedEntry {
                original,
                path: resolved,
            }),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "Skipping entry: not a directory");
                None
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unresolvable entry");
                None
            }
        }
    }
}

/// Resolve `path` to an application directory. Symlinks resolve to their
/// canonical target; real directories are returned as given.
async fn resolve_application_dir(path: &Path) -> io::Result<Option<PathBuf>> {
    let meta = fs::symlink_metadata(path).await?;

    if meta.file_type().is_symlink() {
        let target = fs::canonicalize(path).await?;
        let target_meta = fs::metadata(&target).await?;
        Ok(target_meta.is_dir().then_some(target))
    } else if meta.is_dir() {
        Ok(Some(path.to_path_buf()))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Pow").join("Hosts");

        let roots = ApplicationRootResolver::new(&root)
            .gather_application_roots()
            .await
            .unwrap();

        assert!(roots.is_empty());
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_root_that_is_a_file_is_a_create_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("hosts");
        std::fs::write(&root, "not a directory").unwrap();

        let err = ApplicationRootResolver::new(&root)
            .gather_application_roots()
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Create { ref path, .. } if path == &root));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_root_is_a_list_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = temp.path().join("hosts");
        std::fs::create_dir(&root).unwrap();
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root.
        if std::fs::read_dir(&root).is_ok() {
            std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = ApplicationRootResolver::new(&root).gather_application_roots().await;
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, DirectoryError::List { ref path, .. } if path == &root));
    }

    #[tokio::test]
    async fn test_keys_are_lowercased() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("MyApp")).unwrap();

        let roots = ApplicationRootResolver::new(temp.path())
            .gather_application_roots()
            .await
            .unwrap();

        assert_eq!(roots.get("myapp"), Some(temp.path().join("MyApp").as_path()));
        assert_eq!(roots.get("MyApp"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_to_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("hosts");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(temp.path().join("README"), "").unwrap();
        std::os::unix::fs::symlink(temp.path().join("README"), root.join("readme")).unwrap();

        let roots = ApplicationRootResolver::new(&root)
            .gather_application_roots()
            .await
            .unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_from_iter_lowercases_and_keeps_first() {
        let roots: ApplicationRoots = [("Basecamp", "/apps/a"), ("basecamp", "/apps/b")]
            .into_iter()
            .collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots.get("basecamp"), Some(Path::new("/apps/a")));
    }
}
