//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Domain errors represent malformed outline data.
/// The in-memory outline is never touched when one of these is returned.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Bytes are not parseable as JSON.
    #[error("invalid outline format: {0}")]
    Format(#[from] serde_json::Error),

    /// Parseable JSON that is not an array of record-like objects.
    #[error("unexpected outline shape: {message}")]
    Shape { message: String },

    #[error("invalid node path: {0}")]
    InvalidPath(String),
}

impl DomainError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
