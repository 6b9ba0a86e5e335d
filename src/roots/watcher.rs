//! Host root watcher for cache invalidation.

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::roots::cache::CachedRoots;

/// Invalidates a `CachedRoots` whenever an entry in the host root is
/// created, removed or changed.
pub struct HostRootWatcher {
    path: PathBuf,
    cache: CachedRoots,
}

impl HostRootWatcher {
    pub fn new(cache: CachedRoots) -> Self {
        Self {
            path: cache.resolver().root().to_path_buf(),
            cache,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        // The directory must exist before it can be watched.
        std::fs::create_dir_all(&self.path).map_err(notify::Error::io)?;

        let cache = self.cache.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_create() || event.kind.is_remove() || event.kind.is_modify() {
                        tracing::debug!(paths = ?event.paths, "Host root changed, invalidating application roots");
                        cache.invalidate();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Host root watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::scanner::ApplicationRootResolver;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_entry_invalidates_cache() {
        let temp = TempDir::new().unwrap();
        let cache = CachedRoots::new(ApplicationRootResolver::new(temp.path()));
        let _watcher = HostRootWatcher::new(cache.clone()).run().unwrap();

        assert!(cache.load().await.unwrap().is_empty());
        assert!(cache.is_cached());

        std::fs::create_dir(temp.path().join("myapp")).unwrap();

        let mut invalidated = false;
        for _ in 0..50 {
            if !cache.is_cached() {
                invalidated = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(invalidated, "watcher should invalidate after a new entry");
        assert!(cache.load().await.unwrap().get("myapp").is_some());
    }
}
