//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// No clipboard channel in this environment; nothing was changed.
    #[error("clipboard not available in this environment")]
    ClipboardUnavailable,

    #[error("clipboard error: {message}")]
    Clipboard { message: String },

    /// Reading or writing a document or session file failed.
    #[error("storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document has no file path, use save-as")]
    NoFilePath,

    #[error("not a link: {0}")]
    NotALink(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("extension '{name}' failed: {message}")]
    Extension { name: String, message: String },

    #[error("no document at tab {0}")]
    NoSuchDocument(usize),

    #[error("failed to open {target}: {message}")]
    Launch { target: String, message: String },
}

impl ApplicationError {
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// True for malformed file or clipboard content.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ApplicationError::Domain(DomainError::Format(_) | DomainError::Shape { .. })
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
