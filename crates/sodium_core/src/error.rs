//! Error types for the core crate.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the collection cache or config handling.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A durability backend operation failed.
    #[error("store error: {0}")]
    Store(#[from] sodium_store::StoreError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A JSON document failed to serialize.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
