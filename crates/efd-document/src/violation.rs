use efd_canonical::BlockId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document-level diagnostic about nesting, ordering or counts.
///
/// `position` is the emission index of the offending record when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralViolation {
    /// The record's required parent is not the innermost open context.
    #[error("record #{position} ({tag}) expects parent {expected} but found {}", .found.as_deref().unwrap_or("none"))]
    UnexpectedParent {
        /// Position of the offending record.
        position: usize,
        /// Register tag.
        tag: String,
        /// Parent the schema requires.
        expected: String,
        /// Innermost open register, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        found: Option<String>,
    },
    /// A declared count differs from the accumulated one.
    #[error("{subject}: declared {declared}, counted {actual}")]
    CountMismatch {
        /// Position of the declaring record, if the count came from one.
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        /// What was counted: a register tag, `block X` or `file`.
        subject: String,
        /// Declared count.
        declared: u64,
        /// Accumulated count.
        actual: u64,
    },
    /// Emission into, or closing of, an already closed block.
    #[error("block {block} is already closed")]
    BlockClosed {
        /// Position of the offending record, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        /// Block identifier.
        block: BlockId,
    },
    /// A block was opened but never closed.
    #[error("block {block} was opened but never closed")]
    BlockNotClosed {
        /// Block identifier.
        block: BlockId,
    },
    /// Register emitted but missing from the per-register declarations.
    #[error("register {tag} is present but not declared in the count registers")]
    UndeclaredRegister {
        /// Register tag.
        tag: String,
    },
    /// A register's count was declared more than once.
    #[error("record #{position} declares the count of {tag} again")]
    DuplicateDeclaration {
        /// Position of the repeated declaration.
        position: usize,
        /// Declared register tag.
        tag: String,
    },
    /// Emission after the document was finished.
    #[error("document is finished; {tag} was rejected")]
    DocumentFinished {
        /// Tag of the rejected record.
        tag: String,
    },
}

impl StructuralViolation {
    /// Position of the record the violation refers to.
    pub fn position(&self) -> Option<usize> {
        match self {
            StructuralViolation::UnexpectedParent { position, .. }
            | StructuralViolation::DuplicateDeclaration { position, .. } => Some(*position),
            StructuralViolation::CountMismatch { position, .. }
            | StructuralViolation::BlockClosed { position, .. } => *position,
            StructuralViolation::BlockNotClosed { .. }
            | StructuralViolation::UndeclaredRegister { .. }
            | StructuralViolation::DocumentFinished { .. } => None,
        }
    }
}
