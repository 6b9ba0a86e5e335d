//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → environment.rs (captured once, never mutated)
//!     → user_env.rs (~/.powconfig evaluated, variables overlaid)
//!
//! explicit overrides (code or TOML file)
//!     + merged environment
//!     → loader.rs (override > env var > default)
//!     → validation.rs (semantic checks)
//!     → store.rs Configuration (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; domain lists are normalized once
//! - The merged environment is handed to child-spawning code explicitly
//! - Validation separates syntactic (parsing) from semantic checks

pub mod environment;
pub mod loader;
pub mod schema;
pub mod store;
pub mod user_env;
pub mod validation;

pub use environment::Environment;
pub use loader::ConfigError;
pub use schema::{ConfigOverrides, ConfigSnapshot, DomainList};
pub use store::Configuration;
pub use user_env::ConfigLoadError;
