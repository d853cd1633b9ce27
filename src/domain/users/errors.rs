//! Users service errors.

use thiserror::Error;

use crate::errors::{BackendError, ErrorKind};

/// User management failures.
#[derive(Debug, Error)]
pub enum UsersServiceError {
    /// The user does not exist.
    #[error("user not found")]
    NotFound,

    /// A required field is missing or invalid.
    #[error("{0}")]
    Validation(&'static str),

    /// The actor's role may not perform the change.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Another user already has this username.
    #[error("username is already taken")]
    UsernameTaken,

    /// The user is nominated somewhere or has voted.
    #[error("user still has candidacies or votes")]
    StillReferenced,

    /// Any other repository failure.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl UsersServiceError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::UsernameTaken | Self::StillReferenced => ErrorKind::Conflict,
            Self::Backend(error) => error.kind(),
        }
    }
}

impl From<BackendError> for UsersServiceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotFound => Self::NotFound,
            BackendError::AlreadyExists => Self::UsernameTaken,
            error => Self::Backend(error),
        }
    }
}
