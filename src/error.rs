//! Error types and handling for the flexio library.
//!
//! This module defines the main error type `FlexioError` and a convenience
//! `Result` type alias for use throughout the library.

use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, FlexioError>;

/// All errors the compiler and the decliner can produce.
///
/// Only two kinds are part of the domain contract: `UnknownLemma`
/// (recoverable, raised on queries for absent lemmas) and `Compile`
/// (fatal at build time). The rest wrap I/O and serialization faults
/// around the dataset artifact.
#[derive(Error, Debug)]
pub enum FlexioError {
    /// I/O operations failed (source or artifact read/write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact (de)serialization failed
    #[error("dataset artifact error: {0}")]
    Json(#[from] serde_json::Error),

    /// Queried lemma absent from the dataset
    #[error("unknown lemma: {0}")]
    UnknownLemma(String),

    /// Malformed directive in a linguistic source file
    #[error("compile error at line {line}: {message}")]
    Compile { line: usize, message: String },

    /// Cross-section validation of a compiled dataset failed
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlexioError {
    /// Builds a `Compile` error anchored to a 1-based source line.
    pub(crate) fn compile(line: usize, message: impl Into<String>) -> Self {
        FlexioError::Compile {
            line,
            message: message.into(),
        }
    }
}
