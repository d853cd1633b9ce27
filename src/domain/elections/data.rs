//! Elections Data

use jiff::Timestamp;

use crate::domain::elections::records::ElectionState;

/// Editable election fields; both create and update send the full set.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectionFields {
    /// Display name.
    pub name: String,
    /// Free text description.
    pub description: String,
    /// Who the elected candidate represents.
    pub representation_type: String,
    /// Voting opens at this instant.
    pub start_date: Timestamp,
    /// Voting stays open up to and including this instant.
    pub end_date: Timestamp,
    /// Stored lifecycle state.
    pub state: ElectionState,
}

/// Direction elections are sorted by start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOrder {
    /// Earliest start first.
    Ascending,
    /// Latest start first.
    Descending,
}

/// Which elections to list, and in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionFilter {
    /// `None` lists every state.
    pub states: Option<Vec<ElectionState>>,
    /// Sort direction by start date.
    pub order: StartOrder,
}

impl ElectionFilter {
    /// Elections offered to voters: every state, earliest start first.
    pub fn available() -> Self {
        Self {
            states: Some(ElectionState::ALL.to_vec()),
            order: StartOrder::Ascending,
        }
    }

    /// Management view: everything, latest start first.
    pub fn management() -> Self {
        Self {
            states: None,
            order: StartOrder::Descending,
        }
    }

    /// Results view: finished elections, latest start first.
    pub fn finalized() -> Self {
        Self {
            states: Some(vec![ElectionState::Finalizada]),
            order: StartOrder::Descending,
        }
    }

    /// Whether an election in `state` passes this filter.
    pub fn admits(&self, state: ElectionState) -> bool {
        self.states
            .as_ref()
            .is_none_or(|states| states.contains(&state))
    }
}
