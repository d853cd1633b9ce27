//! Vote tallying.

use std::collections::BTreeMap;

use crate::domain::{
    candidacies::records::CandidacyId,
    results::records::{CandidateResult, UNNAMED_CANDIDATE},
    votes::records::Ballot,
};

/// Counts `ballots` per candidacy.
///
/// Results are ranked by descending vote count; candidacies with the same
/// count are ordered by ascending id. A candidacy's name is taken from its
/// first ballot that carries one.
pub fn tally<'a, I>(ballots: I) -> Vec<CandidateResult>
where
    I: IntoIterator<Item = &'a Ballot>,
{
    let mut counts: BTreeMap<CandidacyId, (Option<&'a str>, u64)> = BTreeMap::new();

    for ballot in ballots {
        let entry = counts.entry(ballot.candidacy_id).or_insert((None, 0));

        if entry.0.is_none() {
            entry.0 = ballot.candidate_name.as_deref();
        }

        entry.1 += 1;
    }

    let mut results: Vec<CandidateResult> = counts
        .into_iter()
        .map(|(candidacy, (name, votes))| CandidateResult {
            candidacy,
            name: name.unwrap_or(UNNAMED_CANDIDATE).to_string(),
            votes,
        })
        .collect();

    // Stable sort over ascending ids.
    results.sort_by(|a, b| b.votes.cmp(&a.votes));

    results
}
