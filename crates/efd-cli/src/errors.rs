//! CLI error types.

use thiserror::Error;

/// Failures the CLI reports before or instead of running the pipeline.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a record list or record envelope: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} diagnostic(s) reported, nothing written (pass --allow-errors to write anyway)")]
    Diagnostics(u64),
}
