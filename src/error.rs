//! Error types for hiveexplorer.
//!
//! This module provides a unified error handling approach using `thiserror`,
//! matching the taxonomy in the design: NotFound, IOFailure, InvalidInput,
//! Fatal. Cancelled outcomes never reach this type — background loaders
//! check their `CancelToken` and simply drop their result instead of
//! propagating an error for it (see `crate::loaders`).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hiveexplorer operations.
pub type Result<T> = std::result::Result<T, HiveExplorerError>;

/// Errors that can occur in hiveexplorer.
#[derive(Debug, Error)]
pub enum HiveExplorerError {
    /// The hive file could not be found or opened.
    #[error("hive file not found: {path}")]
    HiveNotFound { path: PathBuf },

    /// A requested key path does not exist in the hive.
    #[error("key not found: {path}")]
    KeyNotFound { path: String },

    /// An I/O error occurred while reading the hive.
    #[error("I/O error reading hive: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying hive parser reported an error.
    #[error("hive parse error: {0}")]
    HiveParse(String),

    /// Failed to access the clipboard.
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    /// User input was rejected (empty compare path, malformed filter, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl HiveExplorerError {
    /// Create a HiveNotFound error.
    pub fn hive_not_found(path: impl Into<PathBuf>) -> Self {
        Self::HiveNotFound { path: path.into() }
    }

    /// Create a KeyNotFound error.
    pub fn key_not_found(path: impl Into<String>) -> Self {
        Self::KeyNotFound { path: path.into() }
    }

    /// True for errors that should abort the process (the `Fatal` taxonomy
    /// entry); everything else is recoverable at the call site.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HiveExplorerError::HiveNotFound { .. })
    }
}
