//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Collaborators consume:
//!     → logging.rs registry (one log handle per name)
//! ```
//!
//! # Design Decisions
//! - Structured logging with fields, not formatted strings
//! - Metrics go through the facade; no exporter is bundled

pub mod logging;
pub mod metrics;
