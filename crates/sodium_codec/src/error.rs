//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a container.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer is too short or does not start with the `SODIUM01` magic.
    ///
    /// Callers treat this as "not a container" and fall back to legacy
    /// migration or empty initialization rather than failing hard.
    #[error("not a sodium container: bad or missing magic")]
    BadMagic,

    /// The container ended mid-structure (inside a header, length prefix,
    /// or record body).
    #[error("container truncated at byte offset {offset}")]
    Truncated {
        /// Offset at which more bytes were required.
        offset: usize,
    },

    /// A record failed to serialize during encoding.
    #[error("record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// A length exceeded the container's 32-bit size fields during
    /// encoding.
    #[error("{what} of {len} exceeds the container's 32-bit limit")]
    Oversize {
        /// Which length overflowed (record count or record body).
        what: &'static str,
        /// The offending length.
        len: usize,
    },

    /// A snapshot document was structurally invalid.
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot {
        /// Description of the problem.
        message: String,
    },
}

impl CodecError {
    /// Creates an invalid snapshot error.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }
}
