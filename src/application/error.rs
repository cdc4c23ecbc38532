//! Application-level errors (wraps domain errors)

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add file context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid scheme {}: {source}", path.display())]
    InvalidScheme {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    #[error("{context}: {source}")]
    FileAccess {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("no .xcscheme files found under {}", .0.display())]
    NoSchemes(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// True when the failure is a missing input file or directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApplicationError::FileAccess { source, .. } => source.kind() == io::ErrorKind::NotFound,
            ApplicationError::NoSchemes(_) => true,
            _ => false,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
