//! Declarative EFD register layouts.
//!
//! Each layout is a table of register schemas (fields, hierarchy position,
//! business rules and count declarations) loaded from YAML and checked once
//! at load time. The ICMS/IPI and Contribuições tables are embedded.

#![deny(missing_docs)]

mod error;
/// Layout registries and the embedded tables.
pub mod registry;
/// Business rule descriptors.
pub mod rule;
/// Register schemas and count declarations.
pub mod schema;

pub use error::SchemaError;
pub use registry::{Layout, SchemaRegistry};
pub use rule::{
    suffix_of, Alternate, BusinessRule, ChecksumKind, ChecksumRule, Clamp, CompareOp, CompareRule,
    Condition, ConditionalPresenceRule, EqualityRule, Exemption, ExclusivePresenceRule, Expr,
    Operand, Requirement, SignRule,
};
pub use schema::{CountDeclaration, RecordSchema};
