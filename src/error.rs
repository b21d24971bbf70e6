//! Error types for layoutgan
//!
//! Every fallible operation in the crate returns [`Result`]. Numerical edge
//! cases are handled locally; everything that reaches this enum aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading data, training or persisting state
#[derive(Error, Debug)]
pub enum Error {
    /// A buffer does not have the length implied by its declared shape
    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A batch violates the padding or labelling invariants
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error with context
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON / YAML (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Metrics log failure
    #[error("Metrics log error: {0}")]
    Csv(#[from] csv::Error),

    /// Snapshot encoding failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A checkpoint does not match the network it is loaded into
    #[error("Checkpoint {path} does not match network '{network}': {message}")]
    CheckpointMismatch {
        path: PathBuf,
        network: String,
        message: String,
    },

    /// A loader that must produce batches produced none
    #[error("Loader '{0}' yielded no batches")]
    EmptyLoader(String),
}

impl Error {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a shape mismatch error
    pub fn shape(what: impl Into<String>, expected: Vec<usize>, actual: Vec<usize>) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON: {e}"))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(format!("YAML: {e}"))
    }
}
