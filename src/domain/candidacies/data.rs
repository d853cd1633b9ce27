//! Candidacies Data

use crate::domain::{elections::records::ElectionId, users::records::UserId};

/// Editable candidacy fields; both create and update send the full set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidacyFields {
    /// Nominee.
    pub user_id: UserId,
    /// Election the nominee stands in.
    pub election_id: ElectionId,
    /// Campaign proposal.
    pub proposal: String,
}
