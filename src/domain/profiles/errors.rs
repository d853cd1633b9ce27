//! Profiles service errors.

use thiserror::Error;

use crate::errors::{BackendError, ErrorKind};

/// Profile operation failures.
#[derive(Debug, Error)]
pub enum ProfilesServiceError {
    /// Rejected profile data.
    #[error("{0}")]
    Validation(&'static str),

    /// The actor may not edit this profile.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Repository failure.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl ProfilesServiceError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Backend(error) => error.kind(),
        }
    }
}

impl From<BackendError> for ProfilesServiceError {
    fn from(error: BackendError) -> Self {
        Self::Backend(error)
    }
}
