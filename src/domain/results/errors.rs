//! Results service errors.

use std::io;

use thiserror::Error;

use crate::errors::{BackendError, ErrorKind};

/// Failures while tallying or exporting results.
#[derive(Debug, Error)]
pub enum ResultsServiceError {
    /// The election does not exist.
    #[error("election not found")]
    NotFound,

    /// The election has not finished, so its counts stay hidden.
    #[error("election has not finished yet")]
    NotFinalized,

    /// The CSV could not be written.
    #[error("failed to write export: {0}")]
    Export(#[source] io::Error),

    /// Any other repository failure.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl ResultsServiceError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::NotFinalized => ErrorKind::Validation,
            Self::Export(_) => ErrorKind::Backend,
            Self::Backend(error) => error.kind(),
        }
    }
}

impl From<BackendError> for ResultsServiceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotFound => Self::NotFound,
            error => Self::Backend(error),
        }
    }
}

impl From<io::Error> for ResultsServiceError {
    fn from(error: io::Error) -> Self {
        Self::Export(error)
    }
}
