//! Record engine for EFD registers.
//!
//! Turns raw register inputs into canonical records: fields are
//! standardized, pattern-checked and then run through the register's
//! business rules. Every defect is attached to the record it belongs to.
//!
//! Core invariants:
//! - Only an unknown register tag fails the call; all other problems are data
//! - A record's error list is fixed once the record is built
//! - Check digits are validated through the [`ChecksumValidator`] seam
//!
#![deny(missing_docs)]

/// Check-digit validators.
pub mod checksum;
/// Record pipeline.
pub mod engine;
/// Error types for core operations.
pub mod errors;
/// Canonical records.
pub mod record;
/// Business rule evaluation.
pub mod rules;

pub use checksum::{ChecksumValidator, Modulo11};
pub use engine::Engine;
pub use errors::CoreError;
pub use record::CanonicalRecord;
pub use rules::RuleEvaluator;
