//! Hierarchical assembly and serialization of EFD documents.
//!
//! This crate provides:
//! - [`Document`], which attaches canonical records to their parents and
//!   checks nesting, block lifecycle and declared counts
//! - [`serialize`], the pure record-to-line renderer
//! - [`DocumentWriter`], which writes rendered files and reports their digest
//!
//! Structural problems are reported as [`StructuralViolation`] values and
//! never stop assembly.
//!
#![deny(missing_docs)]

/// Hierarchy assembler.
pub mod document;
/// Error types for document I/O.
pub mod errors;
/// Record filters.
pub mod filter;
/// Line formats.
pub mod format;
/// Record-to-line rendering.
pub mod serializer;
/// Tree navigation helpers.
pub mod view;
/// Structural violations.
pub mod violation;
/// Document writer.
pub mod writer;

pub use document::{Assembled, DeclaredCounts, Document};
pub use errors::DocumentError;
pub use filter::RecordFilter;
pub use format::{LineFormat, LineFormats};
pub use serializer::serialize;
pub use view::Ancestors;
pub use violation::StructuralViolation;
pub use writer::{DocumentWriter, WriteOptions, WriteSummary};
