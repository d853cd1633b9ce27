//! Candidacies service errors.

use thiserror::Error;

use crate::errors::{BackendError, ErrorKind};

/// Candidacy management failures.
#[derive(Debug, Error)]
pub enum CandidaciesServiceError {
    /// The candidacy does not exist.
    #[error("candidacy not found")]
    NotFound,

    /// A required field is missing or a reference is unknown.
    #[error("{0}")]
    Validation(&'static str),

    /// The actor's role may not manage candidacies.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Votes were already cast for the candidacy.
    #[error("candidacy has recorded votes")]
    HasVotes,

    /// Any other repository failure.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl CandidaciesServiceError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::HasVotes => ErrorKind::Conflict,
            Self::Backend(error) => error.kind(),
        }
    }
}

impl From<BackendError> for CandidaciesServiceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotFound => Self::NotFound,
            BackendError::InvalidReference => {
                Self::Validation("nominee or election does not exist")
            }
            error => Self::Backend(error),
        }
    }
}
