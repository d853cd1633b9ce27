//! Votes Data

use crate::domain::{
    candidacies::records::CandidacyId, elections::records::ElectionId, users::records::UserId,
};

/// New Vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewVote {
    /// Voter.
    pub user_id: UserId,
    /// Election voted in.
    pub election_id: ElectionId,
    /// Chosen candidacy.
    pub candidacy_id: CandidacyId,
}
