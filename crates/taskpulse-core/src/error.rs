//! Core error types for taskpulse-core.
//!
//! The analytics computations themselves never fail; errors only surface at
//! the edges: reading and writing the blob store, loading configuration,
//! ingesting malformed data, and addressing tasks, projects or labels that
//! do not exist.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskpulse-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A task id that is not present in the snapshot
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Label not found: {0}")]
    LabelNotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Blob store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read a key
    #[error("Failed to read '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a key
    #[error("Failed to write '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored blob is not valid JSON for the expected shape
    #[error("Corrupt data under '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Key contains characters that cannot map to a file name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors raised at the data-ingestion boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Due date string is neither `YYYY-MM-DD` nor `YYYY-MM-DDTHH:MM[:SS]`
    #[error("Invalid due date '{0}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM")]
    InvalidDueDate(String),

    /// Priority outside 1..=4
    #[error("Invalid priority {0}: expected 1 (urgent) through 4")]
    InvalidPriority(i64),

    /// Import payload missing one of the required collections
    #[error("Invalid import: {0}")]
    InvalidImport(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
