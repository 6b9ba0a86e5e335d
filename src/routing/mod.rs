//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Domain compilation (at startup):
//!     configured domains
//!     → matcher.rs (DomainMatcher, one per DNS / HTTP side)
//!
//! Incoming hostname:
//!     → matcher.rs (is this host ours at all?)
//!     → lookup.rs (candidate names per domain, most specific first)
//!     → host-root snapshot (roots::scanner / roots::cache)
//!     → Return: HostMatch or no match
//! ```
//!
//! # Design Decisions
//! - Matchers compiled once, immutable at runtime
//! - No regex (literal suffix comparison only)
//! - Deterministic: same host and snapshot always give the same answer
//! - First match wins (domain order, then specificity)

pub mod lookup;
pub mod matcher;

pub use lookup::{candidates_for_host, find_application_root_for_host, HostLookup, HostMatch};
pub use matcher::DomainMatcher;
