//! Candidacy Records

use jiff::Timestamp;

use crate::{
    domain::{elections::records::ElectionId, users::records::UserId},
    ids::TypedId,
};

/// Candidacy Id
pub type CandidacyId = TypedId<CandidacyRecord>;

/// Candidacy Record
#[derive(Debug, Clone, PartialEq)]
pub struct CandidacyRecord {
    /// Row id.
    pub id: CandidacyId,
    /// Campaign proposal.
    pub proposal: String,

    /// Nominee.
    pub user_id: UserId,
    /// Election the nominee stands in.
    pub election_id: ElectionId,

    /// Creation time.
    pub created_at: Timestamp,
    /// Last edit.
    pub updated_at: Timestamp,
}

/// A candidacy joined with the names the management view displays.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidacyListing {
    /// The candidacy itself.
    pub candidacy: CandidacyRecord,
    /// Nominee username, when the user still exists.
    pub username: Option<String>,
    /// Election name, when the election still exists.
    pub election_name: Option<String>,
}
