//! Elections service errors.

use thiserror::Error;

use crate::errors::{BackendError, ErrorKind};

/// Election management failures.
#[derive(Debug, Error)]
pub enum ElectionsServiceError {
    /// The election does not exist.
    #[error("election not found")]
    NotFound,

    /// A required field is missing or the window is invalid.
    #[error("{0}")]
    Validation(&'static str),

    /// The actor's role may not manage elections.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Candidacies or votes still point at the election.
    #[error("election still has candidacies or votes")]
    StillReferenced,

    /// Any other repository failure.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl ElectionsServiceError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::StillReferenced => ErrorKind::Conflict,
            Self::Backend(error) => error.kind(),
        }
    }
}

impl From<BackendError> for ElectionsServiceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotFound => Self::NotFound,
            BackendError::InvalidData => Self::Validation("election data rejected by the backend"),
            error => Self::Backend(error),
        }
    }
}
