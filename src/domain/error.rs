//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Domain errors describe documents that cannot be read or written as XML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed XML at byte {position}: {message}")]
    Parse { message: String, position: u64 },

    #[error("cannot serialize XML: {0}")]
    Serialize(String),
}

impl DomainError {
    /// Create a parse error at a byte offset of the input.
    pub fn parse(message: impl Into<String>, position: u64) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
