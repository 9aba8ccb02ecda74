use thiserror::Error;

/// Errors that can occur while writing documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// I/O error during write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Target exists and overwriting was not allowed.
    #[error("{0} already exists; refusing to overwrite")]
    FileExists(String),
}
