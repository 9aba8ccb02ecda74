//! Canonical field model for EFD registers.
//!
//! Field specs, value kinds and fixed-point scales describe what a register
//! field may hold. The standardizer turns loosely typed inputs into canonical
//! values and the pattern validator checks their text form. Every defect is
//! reported as a [`RecordError`] value; nothing here aborts on bad input.
//!
#![deny(missing_docs)]

/// Content digests of rendered documents.
pub mod digest;
/// Field specs and compiled patterns.
pub mod field;
/// Register tags, field names and block identifiers.
pub mod identifiers;
/// Pattern and delimiter checks over canonical text.
pub mod pattern;
/// Raw, loosely typed record inputs.
pub mod raw;
/// Fixed-point `TvD` scales.
pub mod scale;
/// Raw-to-canonical coercion.
pub mod standardizer;
/// Per-category diagnostic summaries.
pub mod summary;
/// Error taxonomy.
pub mod validation;
/// Value kinds and canonical values.
pub mod value;

pub use digest::{Digest, DigestAlg, Sha256Stream};
pub use field::{FieldPattern, FieldSpec};
pub use identifiers::{BlockId, FieldName, RecordTag};
pub use pattern::{check_patterns, FIELD_DELIMITER};
pub use raw::{RawFields, RawRecord};
pub use scale::Scale;
pub use standardizer::{Standardized, Standardizer};
pub use summary::{ErrorSummary, SummaryStatus};
pub use validation::{ErrorCategory, RecordError, ValidationError};
pub use value::{FieldValue, ValueKind, DATE_FORMAT};
