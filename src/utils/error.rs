//! Error types for the entire application.
//!
//! `thiserror` enums cover the library's JSON edges; `main.rs` and the
//! commands propagate them through `anyhow`.
//!
//! The tree and context algorithms themselves never fail: empty input and
//! unknown path ids come back as empty results.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading call records, path datasets or selections
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Input does not match the expected record shape: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid input layout: {0}")]
    InvalidFormat(String),
}

/// Errors raised by the JSON report reader and writer
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
