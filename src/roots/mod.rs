//! Application-root discovery.
//!
//! # Data Flow
//! ```text
//! host root directory
//!     → scanner.rs (create if missing, list, resolve each entry concurrently)
//!     → ApplicationRoots (lowercased name → directory)
//!
//! Optional caching:
//!     cache.rs keeps the last snapshot
//!     watcher.rs invalidates it when the host root changes
//! ```
//!
//! # Design Decisions
//! - Only the root itself can fail a scan; bad entries are skipped
//! - Snapshots are values; nothing mutates a published snapshot

pub mod cache;
pub mod scanner;
pub mod watcher;

pub use cache::{CachedRoots, RootSource};
pub use scanner::{ApplicationRootResolver, ApplicationRoots, DirectoryError, DEFAULT_ENTRY};
pub use watcher::HostRootWatcher;
