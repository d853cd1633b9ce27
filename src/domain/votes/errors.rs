//! Voting errors.

use thiserror::Error;

use crate::errors::{BackendError, ErrorKind};

/// Why a vote was not recorded.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The election does not exist.
    #[error("election not found")]
    ElectionNotFound,

    /// The election has not started at the time of voting.
    #[error("election is not open for voting yet")]
    ElectionNotOpen,

    /// The voter's role may not vote.
    #[error("administrators cannot vote")]
    RoleNotEligible,

    /// The voter stands as a candidate in this election.
    #[error("candidates cannot vote in an election they stand in")]
    CandidateSelfVote,

    /// The voter already cast a vote in this election.
    #[error("already voted in this election")]
    AlreadyVoted,

    /// The chosen candidacy is unknown or belongs to another election.
    #[error("candidacy not found in this election")]
    CandidacyNotFound,

    /// Any other repository failure.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl VoteError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ElectionNotFound | Self::CandidacyNotFound => ErrorKind::NotFound,
            Self::ElectionNotOpen => ErrorKind::Validation,
            Self::RoleNotEligible | Self::CandidateSelfVote => ErrorKind::Unauthorized,
            Self::AlreadyVoted => ErrorKind::Conflict,
            Self::Backend(error) => error.kind(),
        }
    }
}

impl From<BackendError> for VoteError {
    fn from(error: BackendError) -> Self {
        if error.is_unique_violation() {
            Self::AlreadyVoted
        } else {
            Self::Backend(error)
        }
    }
}
