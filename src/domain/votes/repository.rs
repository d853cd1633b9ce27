//! Votes Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    domain::{
        candidacies::records::CandidacyId,
        elections::records::ElectionId,
        users::records::UserId,
        votes::{
            data::NewVote,
            records::{Ballot, VoteId, VoteRecord},
        },
    },
    errors::BackendError,
};

const FIND_VOTE_SQL: &str = include_str!("sql/find_vote.sql");
const CREATE_VOTE_SQL: &str = include_str!("sql/create_vote.sql");
const LIST_BALLOTS_SQL: &str = include_str!("sql/list_ballots.sql");

/// Backend access to the `votes` table.
#[automock]
#[async_trait]
pub trait VotesRepository: Send + Sync {
    /// The vote `user` cast in `election`, if any.
    async fn find_vote(
        &self,
        user: UserId,
        election: ElectionId,
    ) -> Result<Option<VoteRecord>, BackendError>;

    /// Inserts a vote. A second vote for the same user and election fails with
    /// [`BackendError::AlreadyExists`].
    async fn create_vote(
        &self,
        vote: &NewVote,
        now: Timestamp,
    ) -> Result<VoteRecord, BackendError>;

    /// Every vote of `election` with the chosen nominee's username.
    async fn list_ballots(&self, election: ElectionId) -> Result<Vec<Ballot>, BackendError>;
}

/// PostgreSQL-backed votes repository.
#[derive(Debug, Clone)]
pub struct PgVotesRepository {
    pool: PgPool,
}

impl PgVotesRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VotesRepository for PgVotesRepository {
    async fn find_vote(
        &self,
        user: UserId,
        election: ElectionId,
    ) -> Result<Option<VoteRecord>, BackendError> {
        Ok(query_as::<Postgres, VoteRecord>(FIND_VOTE_SQL)
            .bind(user.get())
            .bind(election.get())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_vote(
        &self,
        vote: &NewVote,
        now: Timestamp,
    ) -> Result<VoteRecord, BackendError> {
        Ok(query_as::<Postgres, VoteRecord>(CREATE_VOTE_SQL)
            .bind(vote.user_id.get())
            .bind(vote.election_id.get())
            .bind(vote.candidacy_id.get())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_ballots(&self, election: ElectionId) -> Result<Vec<Ballot>, BackendError> {
        Ok(query_as::<Postgres, Ballot>(LIST_BALLOTS_SQL)
            .bind(election.get())
            .fetch_all(&self.pool)
            .await?)
    }
}

impl<'r> FromRow<'r, PgRow> for VoteRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: VoteId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            election_id: ElectionId::new(row.try_get("election_id")?),
            candidacy_id: CandidacyId::new(row.try_get("candidacy_id")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Ballot {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            candidacy_id: CandidacyId::new(row.try_get("candidacy_id")?),
            candidate_name: row.try_get("candidate_name")?,
        })
    }
}
