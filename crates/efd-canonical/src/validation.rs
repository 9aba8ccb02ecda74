use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::RecordTag;
use crate::value::ValueKind;

/// Validation errors for canonical primitives.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a numeric quantity exceeds its bounds.
    #[error("{field} ({value}) is out of bounds")]
    OutOfBounds {
        /// Field name that is out of bounds.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a field pattern cannot be compiled.
    #[error("pattern '{pattern}' does not compile: {reason}")]
    InvalidPattern {
        /// Pattern source text.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// Category of a diagnostic, used for summaries and set comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A required field was not supplied.
    MissingRequiredField,
    /// A supplied value does not match its field pattern.
    PatternMismatch,
    /// A supplied value cannot be read as the field's kind.
    TypeCoercionFailure,
    /// The input names a field the register does not have.
    UnknownField,
    /// A per-register semantic or arithmetic rule failed.
    BusinessRuleViolation,
    /// A structured identifier has a wrong check digit.
    ChecksumFailure,
    /// Nesting, ordering or count violation across the document.
    StructuralViolation,
}

/// Diagnostic attached to a single record.
///
/// Record errors never abort standardization or validation; every stage
/// appends to the same list so a record reports all its defects at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RecordError {
    /// A required field was absent.
    #[error("[{tag}] required field {field} was not supplied")]
    MissingRequiredField {
        /// Register tag.
        tag: RecordTag,
        /// Field name.
        field: String,
    },
    /// Canonical text did not match the field pattern.
    #[error("[{tag}] {field} ('{value}') does not match {pattern}")]
    PatternMismatch {
        /// Register tag.
        tag: RecordTag,
        /// Field name.
        field: String,
        /// Canonical text that was checked.
        value: String,
        /// Pattern source.
        pattern: String,
    },
    /// Raw input could not be coerced to the field kind.
    #[error("[{tag}] {field} ('{value}') cannot be read as {kind}: {reason}")]
    TypeCoercionFailure {
        /// Register tag.
        tag: RecordTag,
        /// Field name.
        field: String,
        /// Raw input as text.
        value: String,
        /// Expected kind.
        kind: ValueKind,
        /// Why coercion failed.
        reason: String,
    },
    /// Input key does not name a field of the register.
    #[error("[{tag}] {field} is not a field of this register")]
    UnknownField {
        /// Register tag.
        tag: RecordTag,
        /// Offending input key.
        field: String,
    },
    /// A business rule failed.
    #[error("[{tag}] {field}: {message}")]
    BusinessRuleViolation {
        /// Register tag.
        tag: RecordTag,
        /// Field the rule is anchored on.
        field: String,
        /// Rule kind that failed.
        rule: String,
        /// Human-readable explanation.
        message: String,
    },
    /// A delegated checksum rejected the value.
    #[error("[{tag}] {field} ('{value}'): {message}")]
    ChecksumFailure {
        /// Register tag.
        tag: RecordTag,
        /// Field name.
        field: String,
        /// Value that was checked.
        value: String,
        /// Human-readable explanation.
        message: String,
    },
}

impl RecordError {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RecordError::MissingRequiredField { .. } => ErrorCategory::MissingRequiredField,
            RecordError::PatternMismatch { .. } => ErrorCategory::PatternMismatch,
            RecordError::TypeCoercionFailure { .. } => ErrorCategory::TypeCoercionFailure,
            RecordError::UnknownField { .. } => ErrorCategory::UnknownField,
            RecordError::BusinessRuleViolation { .. } => ErrorCategory::BusinessRuleViolation,
            RecordError::ChecksumFailure { .. } => ErrorCategory::ChecksumFailure,
        }
    }

    /// Returns the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            RecordError::MissingRequiredField { field, .. }
            | RecordError::PatternMismatch { field, .. }
            | RecordError::TypeCoercionFailure { field, .. }
            | RecordError::UnknownField { field, .. }
            | RecordError::BusinessRuleViolation { field, .. }
            | RecordError::ChecksumFailure { field, .. } => field,
        }
    }
}
