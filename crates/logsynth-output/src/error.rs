//! Error types for record outputs.

use thiserror::Error;

/// Errors that can occur while building or driving an output.
#[derive(Error, Debug)]
pub enum OutputError {
    /// The output section is inconsistent.
    #[error("invalid output configuration: {0}")]
    Config(String),

    /// The output section could not be deserialized.
    #[error("invalid output configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The object could not be stored.
    #[error("upload to s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    /// The output was used after `close`.
    #[error("output is closed")]
    Closed,
}
