use efd_canonical::ValidationError;
use thiserror::Error;

/// Errors raised while loading or querying a layout table.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The table text is not valid YAML or does not match the table shape.
    #[error("layout table parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field or identifier inside the table is malformed.
    #[error("invalid layout entry: {0}")]
    Invalid(#[from] ValidationError),

    /// Layout name that matches no supported layout.
    #[error("unknown layout {0}; expected icms-ipi or contribuicoes")]
    UnknownLayout(String),

    /// Lookup of a tag the layout does not define.
    #[error("unknown record type {0}")]
    UnknownRecordType(String),

    /// Two entries share a tag.
    #[error("register {0} is defined twice")]
    DuplicateTag(String),

    /// Two fields of one register share a name.
    #[error("register {tag} declares field {field} twice")]
    DuplicateField {
        /// Register tag.
        tag: String,
        /// Field name.
        field: String,
    },

    /// A rule or count declaration names a field the register does not have.
    #[error("register {tag}: {context} references unknown field {field}")]
    UnknownFieldReference {
        /// Register tag.
        tag: String,
        /// Rule kind or `count`.
        context: String,
        /// Missing field name.
        field: String,
    },

    /// A declared parent tag is not part of the layout.
    #[error("register {tag} declares parent {parent}, which is not defined")]
    MissingParent {
        /// Register tag.
        tag: String,
        /// Declared parent.
        parent: String,
    },

    /// Level and parent are inconsistent.
    #[error("register {tag}: {reason}")]
    BadHierarchy {
        /// Register tag.
        tag: String,
        /// What is wrong.
        reason: String,
    },

    /// A rule or count declaration has invalid parameters.
    #[error("register {tag}: invalid {context}: {reason}")]
    InvalidRule {
        /// Register tag.
        tag: String,
        /// Rule kind or `count`.
        context: String,
        /// What is wrong.
        reason: String,
    },
}
