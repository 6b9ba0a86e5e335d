//! Application-root snapshot sources.
//!
//! # Responsibilities
//! - Abstract "give me the current name → path mapping" for lookups
//! - Optionally keep the last scan until something invalidates it
//!
//! # Design Decisions
//! - Lock-free reads via `ArcSwap`
//! - Invalidation bumps a generation; a scan that raced with an
//!   invalidation is returned to its caller but never stored
//! - When two scans race, the first stored snapshot stays
//! - Failed scans are never cached

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::roots::scanner::{ApplicationRootResolver, ApplicationRoots, DirectoryError};

/// Source of application-root snapshots.
pub trait RootSource {
    fn application_roots(
        &self,
    ) -> impl Future<Output = Result<Arc<ApplicationRoots>, DirectoryError>> + Send;
}

/// Scans on every call.
impl RootSource for ApplicationRootResolver {
    async fn application_roots(&self) -> Result<Arc<ApplicationRoots>, DirectoryError> {
        self.gather_application_roots().await.map(Arc::new)
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    roots: Option<Arc<ApplicationRoots>>,
}

/// Outcome of storing a finished scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publish {
    Stored,
    /// The generation moved on while scanning.
    Invalidated,
    /// Another scan of the same generation got there first.
    Superseded,
}

/// Reuses the last successful scan until invalidated.
#[derive(Debug, Clone)]
pub struct CachedRoots {
    resolver: ApplicationRootResolver,
    slot: Arc<ArcSwap<Slot>>,
}

impl CachedRoots {
    pub fn new(resolver: ApplicationRootResolver) -> Self {
        Self {
            resolver,
            slot: Arc::new(ArcSwap::from_pointee(Slot::default())),
        }
    }

    pub fn resolver(&self) -> &ApplicationRootResolver {
        &self.resolver
    }

    /// Drop the cached snapshot; the next read rescans.
    pub fn invalidate(&self) {
        self.slot.rcu(|slot| Slot {
            generation: slot.generation + 1,
            roots: None,
        });
    }

    pub fn is_cached(&self) -> bool {
        self.slot.load().roots.is_some()
    }

    pub async fn load(&self) -> Result<Arc<ApplicationRoots>, DirectoryError> {
        let current = self.slot.load_full();
        if let Some(roots) = &current.roots {
            return Ok(roots.clone());
        }

        let roots = Arc::new(self.resolver.gather_application_roots().await?);

        match self.publish(&current, roots.clone()) {
            Publish::Stored => {}
            Publish::Invalidated => {
                tracing::debug!("Host root invalidated during scan; not caching result");
            }
            Publish::Superseded => {
                tracing::debug!("Concurrent scan already cached a snapshot; keeping it");
            }
        }
        Ok(roots)
    }

    /// Store `roots` only if the slot still holds `current`.
    fn publish(&self, current: &Arc<Slot>, roots: Arc<ApplicationRoots>) -> Publish {
        let next = Arc::new(Slot {
            generation: current.generation,
            roots: Some(roots),
        });
        let previous = self.slot.compare_and_swap(current, next);
        if Arc::ptr_eq(&previous, current) {
            Publish::Stored
        } else if previous.generation != current.generation {
            Publish::Invalidated
        } else {
            Publish::Superseded
        }
    }
}

impl RootSource for CachedRoots {
    async fn application_roots(&self) -> Result<Arc<ApplicationRoots>, DirectoryError> {
        self.load().await
    }
}
