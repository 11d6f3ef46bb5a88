//! Error types for the entire crate.
//!
//! We use `thiserror` for library-style errors with custom types.
//! Recoverable conditions (malformed documents, bad locations) return
//! `Result`; violated enumerator postconditions are programmer errors and
//! are surfaced with assertions instead.

use thiserror::Error;

/// Errors that can occur while decoding trace documents
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Trace document has no 'trace_data' field")]
    MissingTraceData,
}

/// Errors that can occur while writing results
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
