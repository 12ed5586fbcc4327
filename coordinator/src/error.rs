//! Coordinator-specific error types

use std::path::Path;

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("{operation} failed for {path}: {source}")]
    StoreError {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {field}: {message}")]
    ConfigurationError { field: String, message: String },

    #[error("HTTP server startup failed on {address}: {message}")]
    ServerStartupFailed { address: String, message: String },

    #[error("Signal handling failed: {message}")]
    SignalError { message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoordinatorError {
    /// Store I/O failure on a specific artifact
    pub fn store(operation: &str, path: &Path, source: std::io::Error) -> Self {
        Self::StoreError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }

    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
