//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a durability backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container file failed to encode or decode.
    #[error("codec error: {0}")]
    Codec(#[from] sodium_codec::CodecError),

    /// The SQL backend reported an error.
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A record without a string `id` field cannot be stored relationally.
    #[error("record in `{collection}` has no string id field")]
    MissingId {
        /// The collection the record belongs to.
        collection: String,
    },

    /// An unrecognized backend selector.
    #[error("unknown backend type: {name}")]
    UnknownBackend {
        /// The selector that failed to parse.
        name: String,
    },
}

impl StoreError {
    /// Creates a missing-id error.
    pub fn missing_id(collection: impl Into<String>) -> Self {
        Self::MissingId {
            collection: collection.into(),
        }
    }

    /// Creates an unknown-backend error.
    pub fn unknown_backend(name: impl Into<String>) -> Self {
        Self::UnknownBackend { name: name.into() }
    }
}
