//! Voting service.
//!
//! Eligibility is checked in a fixed order and the first failing rule is
//! reported:
//!
//! 1. the election exists,
//! 2. its state, resolved at the moment of voting, is not PENDIENTE,
//! 3. the voter is not ADMIN or ADMINISTRATIVO,
//! 4. a CANDIDATO voter holds no candidacy in the election,
//! 5. the voter has not voted in the election yet,
//! 6. the chosen candidacy belongs to the election.
//!
//! The unique index on `(user_id, election_id)` backs rule 5 against
//! concurrent submissions.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::{
    domain::{
        candidacies::{
            records::CandidacyId,
            repository::{CandidaciesRepository, PgCandidaciesRepository},
        },
        elections::{
            records::{ElectionId, ElectionState},
            repository::{ElectionsRepository, PgElectionsRepository},
            state::resolve_state,
        },
        users::records::{Actor, Role},
        votes::{
            data::NewVote,
            errors::VoteError,
            records::VoteRecord,
            repository::{PgVotesRepository, VotesRepository},
        },
    },
    errors::BackendError,
};

/// Vote casting over the elections, candidacies and votes repositories.
#[derive(Clone)]
pub struct VotingManager {
    elections: Arc<dyn ElectionsRepository>,
    candidacies: Arc<dyn CandidaciesRepository>,
    votes: Arc<dyn VotesRepository>,
}

impl fmt::Debug for VotingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VotingManager")
            .finish_non_exhaustive()
    }
}

impl VotingManager {
    /// Creates a manager over the given repositories.
    #[must_use]
    pub fn new(
        elections: Arc<dyn ElectionsRepository>,
        candidacies: Arc<dyn CandidaciesRepository>,
        votes: Arc<dyn VotesRepository>,
    ) -> Self {
        Self {
            elections,
            candidacies,
            votes,
        }
    }

    /// Creates a manager backed by PostgreSQL.
    #[must_use]
    pub fn pg(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgElectionsRepository::new(pool.clone())),
            Arc::new(PgCandidaciesRepository::new(pool.clone())),
            Arc::new(PgVotesRepository::new(pool)),
        )
    }
}

#[async_trait]
impl VotingService for VotingManager {
    #[tracing::instrument(
        name = "votes.service.cast_vote",
        skip(self),
        fields(
            voter = %voter.id,
            election_id = %election,
            candidacy_id = %candidacy
        ),
        err
    )]
    async fn cast_vote(
        &self,
        voter: Actor,
        election: ElectionId,
        candidacy: CandidacyId,
        now: Timestamp,
    ) -> Result<VoteRecord, VoteError> {
        let record = match self.elections.get_election(election).await {
            Ok(record) => record,
            Err(BackendError::NotFound) => return Err(VoteError::ElectionNotFound),
            Err(error) => return Err(VoteError::Backend(error)),
        };

        let state = resolve_state(&record, now);

        debug!(stored = %record.state, resolved = %state, "resolved election state");

        if state == ElectionState::Pendiente {
            return Err(VoteError::ElectionNotOpen);
        }

        if voter.role.manages_elections() {
            return Err(VoteError::RoleNotEligible);
        }

        if voter.role == Role::Candidato
            && !self
                .candidacies
                .list_user_candidacies(voter.id, election)
                .await?
                .is_empty()
        {
            return Err(VoteError::CandidateSelfVote);
        }

        if self.votes.find_vote(voter.id, election).await?.is_some() {
            return Err(VoteError::AlreadyVoted);
        }

        match self.candidacies.get_candidacy(candidacy).await {
            Ok(chosen) if chosen.election_id == election => {}
            Ok(_) | Err(BackendError::NotFound) => return Err(VoteError::CandidacyNotFound),
            Err(error) => return Err(VoteError::Backend(error)),
        }

        let vote = self
            .votes
            .create_vote(
                &NewVote {
                    user_id: voter.id,
                    election_id: election,
                    candidacy_id: candidacy,
                },
                now,
            )
            .await?;

        info!(vote_id = %vote.id, "recorded vote");

        Ok(vote)
    }

    #[tracing::instrument(
        name = "votes.service.has_voted",
        skip(self),
        fields(voter = %voter.id, election_id = %election),
        err
    )]
    async fn has_voted(&self, voter: Actor, election: ElectionId) -> Result<bool, VoteError> {
        Ok(self.votes.find_vote(voter.id, election).await?.is_some())
    }
}

/// Casting votes.
#[automock]
#[async_trait]
pub trait VotingService: Send + Sync {
    /// Validates eligibility and records at most one vote per voter and election.
    async fn cast_vote(
        &self,
        voter: Actor,
        election: ElectionId,
        candidacy: CandidacyId,
        now: Timestamp,
    ) -> Result<VoteRecord, VoteError>;

    /// Whether `voter` already voted in `election`.
    async fn has_voted(&self, voter: Actor, election: ElectionId) -> Result<bool, VoteError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            candidacies::{records::CandidacyRecord, repository::MockCandidaciesRepository},
            elections::{records::ElectionRecord, repository::MockElectionsRepository},
            users::records::UserId,
            votes::{records::VoteId, repository::MockVotesRepository},
        },
        errors::ErrorKind,
    };

    use super::*;

    const START: &str = "2025-03-01T08:00:00Z";
    const END: &str = "2025-03-01T18:00:00Z";
    const DURING: &str = "2025-03-01T12:00:00Z";

    fn voter(role: Role) -> Actor {
        Actor {
            id: UserId::new(30),
            role,
        }
    }

    fn election(stored: ElectionState) -> TestResult<ElectionRecord> {
        let start: Timestamp = START.parse()?;

        Ok(ElectionRecord {
            id: ElectionId::new(1),
            name: "Consejo".to_string(),
            description: "Periodo 2025".to_string(),
            representation_type: "Estudiantes".to_string(),
            start_date: start,
            end_date: END.parse()?,
            state: stored,
            created_at: start,
            updated_at: start,
        })
    }

    fn candidacy(id: i64, election: i64) -> TestResult<CandidacyRecord> {
        let at: Timestamp = START.parse()?;

        Ok(CandidacyRecord {
            id: CandidacyId::new(id),
            proposal: "Mas becas".to_string(),
            user_id: UserId::new(40),
            election_id: ElectionId::new(election),
            created_at: at,
            updated_at: at,
        })
    }

    fn elections_returning(record: ElectionRecord) -> MockElectionsRepository {
        let mut elections = MockElectionsRepository::new();

        elections
            .expect_get_election()
            .returning(move |_| Ok(record.clone()));

        elections
    }

    fn manager(
        elections: MockElectionsRepository,
        candidacies: MockCandidaciesRepository,
        votes: MockVotesRepository,
    ) -> VotingManager {
        VotingManager::new(Arc::new(elections), Arc::new(candidacies), Arc::new(votes))
    }

    #[tokio::test]
    async fn unknown_election_is_reported_first() -> TestResult {
        let mut elections = MockElectionsRepository::new();

        elections
            .expect_get_election()
            .returning(|_| Err(BackendError::NotFound));

        let svc = manager(
            elections,
            MockCandidaciesRepository::new(),
            MockVotesRepository::new(),
        );

        let result = svc
            .cast_vote(
                voter(Role::Admin),
                ElectionId::new(9),
                CandidacyId::new(1),
                DURING.parse()?,
            )
            .await;

        assert!(
            matches!(result, Err(VoteError::ElectionNotFound)),
            "expected ElectionNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn pending_election_rejects_before_role_checks() -> TestResult {
        let svc = manager(
            elections_returning(election(ElectionState::Pendiente)?),
            MockCandidaciesRepository::new(),
            MockVotesRepository::new(),
        );

        let result = svc
            .cast_vote(
                voter(Role::Admin),
                ElectionId::new(1),
                CandidacyId::new(1),
                "2025-02-01T00:00:00Z".parse()?,
            )
            .await;

        assert!(
            matches!(result, Err(VoteError::ElectionNotOpen)),
            "expected ElectionNotOpen, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stale_pending_state_is_resolved_at_vote_time() -> TestResult {
        let mut candidacies = MockCandidaciesRepository::new();
        let mut votes = MockVotesRepository::new();

        candidacies
            .expect_get_candidacy()
            .returning(|id| candidacy(id.get(), 1).map_err(|_| BackendError::InvalidData));

        votes.expect_find_vote().returning(|_, _| Ok(None));

        votes.expect_create_vote().times(1).returning(|vote, now| {
            Ok(VoteRecord {
                id: VoteId::new(100),
                user_id: vote.user_id,
                election_id: vote.election_id,
                candidacy_id: vote.candidacy_id,
                created_at: now,
                updated_at: now,
            })
        });

        let svc = manager(
            elections_returning(election(ElectionState::Pendiente)?),
            candidacies,
            votes,
        );

        let vote = svc
            .cast_vote(
                voter(Role::Votante),
                ElectionId::new(1),
                CandidacyId::new(5),
                DURING.parse()?,
            )
            .await?;

        assert_eq!(vote.candidacy_id, CandidacyId::new(5));
        assert_eq!(vote.created_at, vote.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn administrators_cannot_vote() -> TestResult {
        for role in [Role::Admin, Role::Administrativo] {
            let svc = manager(
                elections_returning(election(ElectionState::Activa)?),
                MockCandidaciesRepository::new(),
                MockVotesRepository::new(),
            );

            let result = svc
                .cast_vote(
                    voter(role),
                    ElectionId::new(1),
                    CandidacyId::new(1),
                    DURING.parse()?,
                )
                .await;

            assert!(
                matches!(result, Err(VoteError::RoleNotEligible)),
                "expected RoleNotEligible for {role}, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn candidates_cannot_vote_where_they_stand() -> TestResult {
        let mut candidacies = MockCandidaciesRepository::new();

        candidacies
            .expect_list_user_candidacies()
            .returning(|_, election| {
                Ok(vec![
                    candidacy(3, election.get()).map_err(|_| BackendError::InvalidData)?,
                ])
            });

        let svc = manager(
            elections_returning(election(ElectionState::Activa)?),
            candidacies,
            MockVotesRepository::new(),
        );

        let result = svc
            .cast_vote(
                voter(Role::Candidato),
                ElectionId::new(1),
                CandidacyId::new(3),
                DURING.parse()?,
            )
            .await;

        assert!(
            matches!(result, Err(VoteError::CandidateSelfVote)),
            "expected CandidateSelfVote, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn second_vote_is_rejected_before_insert() -> TestResult {
        let mut votes = MockVotesRepository::new();

        votes.expect_find_vote().returning(|user, election| {
            let at: Timestamp = START.parse().map_err(|_| BackendError::InvalidData)?;

            Ok(Some(VoteRecord {
                id: VoteId::new(1),
                user_id: user,
                election_id: election,
                candidacy_id: CandidacyId::new(2),
                created_at: at,
                updated_at: at,
            }))
        });

        votes.expect_create_vote().never();

        let svc = manager(
            elections_returning(election(ElectionState::Activa)?),
            MockCandidaciesRepository::new(),
            votes,
        );

        let result = svc
            .cast_vote(
                voter(Role::Votante),
                ElectionId::new(1),
                CandidacyId::new(2),
                DURING.parse()?,
            )
            .await;

        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Conflict));

        Ok(())
    }

    #[tokio::test]
    async fn unique_violation_on_insert_is_already_voted() -> TestResult {
        let mut candidacies = MockCandidaciesRepository::new();
        let mut votes = MockVotesRepository::new();

        candidacies
            .expect_get_candidacy()
            .returning(|id| candidacy(id.get(), 1).map_err(|_| BackendError::InvalidData));

        votes.expect_find_vote().returning(|_, _| Ok(None));
        votes
            .expect_create_vote()
            .returning(|_, _| Err(BackendError::AlreadyExists));

        let svc = manager(
            elections_returning(election(ElectionState::Activa)?),
            candidacies,
            votes,
        );

        let result = svc
            .cast_vote(
                voter(Role::Votante),
                ElectionId::new(1),
                CandidacyId::new(2),
                DURING.parse()?,
            )
            .await;

        assert!(
            matches!(result, Err(VoteError::AlreadyVoted)),
            "expected AlreadyVoted, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn candidacy_from_another_election_is_not_found() -> TestResult {
        let mut candidacies = MockCandidaciesRepository::new();
        let mut votes = MockVotesRepository::new();

        candidacies
            .expect_get_candidacy()
            .returning(|id| candidacy(id.get(), 2).map_err(|_| BackendError::InvalidData));

        votes.expect_find_vote().returning(|_, _| Ok(None));
        votes.expect_create_vote().never();

        let svc = manager(
            elections_returning(election(ElectionState::Activa)?),
            candidacies,
            votes,
        );

        let result = svc
            .cast_vote(
                voter(Role::Votante),
                ElectionId::new(1),
                CandidacyId::new(6),
                DURING.parse()?,
            )
            .await;

        assert!(
            matches!(result, Err(VoteError::CandidacyNotFound)),
            "expected CandidacyNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn finalized_elections_still_accept_votes() -> TestResult {
        let mut candidacies = MockCandidaciesRepository::new();
        let mut votes = MockVotesRepository::new();

        candidacies
            .expect_get_candidacy()
            .returning(|id| candidacy(id.get(), 1).map_err(|_| BackendError::InvalidData));

        votes.expect_find_vote().returning(|_, _| Ok(None));
        votes.expect_create_vote().times(1).returning(|vote, now| {
            Ok(VoteRecord {
                id: VoteId::new(2),
                user_id: vote.user_id,
                election_id: vote.election_id,
                candidacy_id: vote.candidacy_id,
                created_at: now,
                updated_at: now,
            })
        });

        let svc = manager(
            elections_returning(election(ElectionState::Finalizada)?),
            candidacies,
            votes,
        );

        let result = svc
            .cast_vote(
                voter(Role::Votante),
                ElectionId::new(1),
                CandidacyId::new(2),
                "2025-05-01T00:00:00Z".parse()?,
            )
            .await;

        assert!(result.is_ok(), "expected vote to be recorded, got {result:?}");

        Ok(())
    }
}
