//! Backend errors and the error taxonomy shared by every service.

use std::fmt::{Display, Formatter, Result as FmtResult};

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind as SqlErrorKind},
};
use thiserror::Error;

/// Category every service error falls into.
///
/// The front end only needs this to decide how to present a failure; none of
/// the categories is retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The entity does not exist.
    NotFound,

    /// A required field is missing or invalid.
    Validation,

    /// The acting role is not allowed to perform the operation.
    Unauthorized,

    /// Duplicate vote, duplicate username or another uniqueness clash.
    Conflict,

    /// Any other remote failure.
    Backend,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::Backend => "backend",
        })
    }
}

/// Failure reported by a repository.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No row matched.
    #[error("record not found")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("record already exists")]
    AlreadyExists,

    /// A foreign key is dangling or still referenced.
    #[error("related record not found")]
    InvalidReference,

    /// A required column was null.
    #[error("missing required data")]
    MissingRequiredData,

    /// A check constraint rejected the row.
    #[error("invalid data")]
    InvalidData,

    /// Unclassified database failure.
    #[error("storage error: {0}")]
    Sql(#[source] Error),

    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Taxonomy category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::AlreadyExists => ErrorKind::Conflict,
            Self::InvalidReference | Self::MissingRequiredData | Self::InvalidData => {
                ErrorKind::Validation
            }
            Self::Sql(_) | Self::Unavailable(_) => ErrorKind::Backend,
        }
    }

    /// Whether this failure is a uniqueness clash raised by the schema.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(SqlErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(SqlErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(SqlErrorKind::CheckViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}

/// Raised when a text column holds a value outside its enumeration.
#[derive(Debug, Error)]
#[error("unknown {column} value `{value}`")]
pub struct UnknownVariant {
    /// Column the value was read from.
    pub column: &'static str,

    /// The offending value.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(column: &'static str, value: &str) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    pub(crate) fn into_decode_error(self) -> Error {
        Error::ColumnDecode {
            index: self.column.to_string(),
            source: Box::new(self),
        }
    }
}
