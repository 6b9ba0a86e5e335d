//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (parsing handles syntax)
//! - Validate value ranges (ports, timeout and worker count > 0)
//! - Check the domain list survived normalization
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over resolved values

use std::fmt;

/// A single semantic problem with a resolved option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A port, timeout or worker count resolved to zero.
    NotPositive { option: &'static str },
    /// No domains remained after normalization.
    NoDomains,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotPositive { option } => write!(f, "{} must be greater than zero", option),
            ValidationError::NoDomains => write!(f, "at least one domain is required"),
        }
    }
}

/// Resolved numeric and list values, borrowed for checking.
pub struct ResolvedValues<'a> {
    pub dst_port: u16,
    pub http_port: u16,
    pub dns_port: u16,
    pub timeout: u64,
    pub workers: usize,
    pub domains: &'a [String],
}

/// Check resolved values, collecting every violation.
pub fn validate(values: &ResolvedValues<'_>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positives = [
        ("dst_port", values.dst_port as u64),
        ("http_port", values.http_port as u64),
        ("dns_port", values.dns_port as u64),
        ("timeout", values.timeout),
        ("workers", values.workers as u64),
    ];
    for (option, value) in positives {
        if value == 0 {
            errors.push(ValidationError::NotPositive { option });
        }
    }

    if values.domains.is_empty() {
        errors.push(ValidationError::NoDomains);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
