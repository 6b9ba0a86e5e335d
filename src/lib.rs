//! Hostname to application resolution for a local development proxy.

pub mod config;
pub mod observability;
pub mod roots;
pub mod routing;

pub use config::{ConfigOverrides, Configuration};
pub use roots::{ApplicationRootResolver, ApplicationRoots, CachedRoots};
pub use routing::{HostLookup, HostMatch};
