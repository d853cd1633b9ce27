//! Vote Records

use jiff::Timestamp;

use crate::{
    domain::{
        candidacies::records::CandidacyId, elections::records::ElectionId, users::records::UserId,
    },
    ids::TypedId,
};

/// Vote Id
pub type VoteId = TypedId<VoteRecord>;

/// Vote Record
///
/// Votes are immutable once cast; there is no update or delete path.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteRecord {
    /// Row id.
    pub id: VoteId,
    /// Voter.
    pub user_id: UserId,
    /// Election voted in.
    pub election_id: ElectionId,
    /// Chosen candidacy.
    pub candidacy_id: CandidacyId,
    /// When the vote was cast.
    pub created_at: Timestamp,
    /// Same as `created_at`; votes are never edited.
    pub updated_at: Timestamp,
}

/// A counted vote: the chosen candidacy and its nominee's username, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    /// Chosen candidacy.
    pub candidacy_id: CandidacyId,
    /// Nominee username, if it still resolves.
    pub candidate_name: Option<String>,
}
