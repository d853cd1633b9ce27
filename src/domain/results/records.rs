//! Result Records

use crate::domain::candidacies::records::CandidacyId;

/// Name shown for a candidacy whose nominee no longer resolves to a user.
pub const UNNAMED_CANDIDATE: &str = "Sin nombre";

/// Votes received by one candidacy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    /// Counted candidacy.
    pub candidacy: CandidacyId,
    /// Nominee username, or a placeholder.
    pub name: String,
    /// Ballots cast for the candidacy.
    pub votes: u64,
}
