use efd_schemas::SchemaError;
use thiserror::Error;

/// Core error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The layout defines no register with this tag.
    #[error("unknown record type {0}")]
    UnknownRecordType(String),
    /// Layout table error.
    #[error("schema error: {0}")]
    Schema(SchemaError),
}

impl From<SchemaError> for CoreError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownRecordType(tag) => CoreError::UnknownRecordType(tag),
            other => CoreError::Schema(other),
        }
    }
}
