//! Election Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;

use crate::{errors::UnknownVariant, ids::TypedId};

/// Election Id
pub type ElectionId = TypedId<ElectionRecord>;

/// Lifecycle state of an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElectionState {
    /// Not yet open.
    Pendiente,

    /// Open for voting.
    Activa,

    /// Closed.
    Finalizada,
}

impl ElectionState {
    /// Every state, in lifecycle order.
    pub const ALL: [ElectionState; 3] = [
        ElectionState::Pendiente,
        ElectionState::Activa,
        ElectionState::Finalizada,
    ];

    /// Stored text value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Activa => "ACTIVA",
            Self::Finalizada => "FINALIZADA",
        }
    }
}

impl Display for ElectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElectionState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("state", s))
    }
}

/// Election Record
#[derive(Debug, Clone, PartialEq)]
pub struct ElectionRecord {
    /// Row id.
    pub id: ElectionId,
    /// Display name.
    pub name: String,
    /// Free text description.
    pub description: String,

    /// Free-form label of what the election appoints.
    pub representation_type: String,

    /// Voting opens at this instant.
    pub start_date: Timestamp,
    /// Last instant voting is open.
    pub end_date: Timestamp,

    /// State as last persisted; may lag behind the clock until reconciled.
    pub state: ElectionState,

    /// Creation time.
    pub created_at: Timestamp,
    /// Last edit of the election fields.
    pub updated_at: Timestamp,
}
