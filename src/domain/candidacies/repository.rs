//! Candidacies Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::{
        candidacies::{
            data::CandidacyFields,
            records::{CandidacyId, CandidacyListing, CandidacyRecord},
        },
        elections::records::ElectionId,
        users::records::UserId,
    },
    errors::BackendError,
};

const LIST_CANDIDACIES_SQL: &str = include_str!("sql/list_candidacies.sql");
const LIST_USER_CANDIDACIES_SQL: &str = include_str!("sql/list_user_candidacies.sql");
const GET_CANDIDACY_SQL: &str = include_str!("sql/get_candidacy.sql");
const CREATE_CANDIDACY_SQL: &str = include_str!("sql/create_candidacy.sql");
const UPDATE_CANDIDACY_SQL: &str = include_str!("sql/update_candidacy.sql");
const DELETE_CANDIDACY_SQL: &str = include_str!("sql/delete_candidacy.sql");

/// Backend access to the `candidacies` table.
#[automock]
#[async_trait]
pub trait CandidaciesRepository: Send + Sync {
    /// Lists candidacies, optionally restricted to one election.
    async fn list_candidacies(
        &self,
        election: Option<ElectionId>,
    ) -> Result<Vec<CandidacyListing>, BackendError>;

    /// Candidacies `user` holds in `election`.
    async fn list_user_candidacies(
        &self,
        user: UserId,
        election: ElectionId,
    ) -> Result<Vec<CandidacyRecord>, BackendError>;

    /// Fails with [`BackendError::NotFound`] for an unknown id.
    async fn get_candidacy(
        &self,
        candidacy: CandidacyId,
    ) -> Result<CandidacyRecord, BackendError>;

    /// Inserts with both timestamps set to `now`.
    async fn create_candidacy(
        &self,
        fields: &CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, BackendError>;

    /// Replaces every editable field and stamps `updated_at`.
    async fn update_candidacy(
        &self,
        candidacy: CandidacyId,
        fields: &CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, BackendError>;

    /// Returns the number of deleted rows. Fails with [`BackendError::InvalidReference`]
    /// while votes point at the candidacy.
    async fn delete_candidacy(&self, candidacy: CandidacyId) -> Result<u64, BackendError>;
}

/// PostgreSQL-backed candidacies repository.
#[derive(Debug, Clone)]
pub struct PgCandidaciesRepository {
    pool: PgPool,
}

impl PgCandidaciesRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidaciesRepository for PgCandidaciesRepository {
    async fn list_candidacies(
        &self,
        election: Option<ElectionId>,
    ) -> Result<Vec<CandidacyListing>, BackendError> {
        Ok(query_as::<Postgres, CandidacyListing>(LIST_CANDIDACIES_SQL)
            .bind(election.map(ElectionId::get))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_user_candidacies(
        &self,
        user: UserId,
        election: ElectionId,
    ) -> Result<Vec<CandidacyRecord>, BackendError> {
        Ok(query_as::<Postgres, CandidacyRecord>(LIST_USER_CANDIDACIES_SQL)
            .bind(user.get())
            .bind(election.get())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_candidacy(
        &self,
        candidacy: CandidacyId,
    ) -> Result<CandidacyRecord, BackendError> {
        Ok(query_as::<Postgres, CandidacyRecord>(GET_CANDIDACY_SQL)
            .bind(candidacy.get())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn create_candidacy(
        &self,
        fields: &CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, BackendError> {
        Ok(query_as::<Postgres, CandidacyRecord>(CREATE_CANDIDACY_SQL)
            .bind(&fields.proposal)
            .bind(fields.user_id.get())
            .bind(fields.election_id.get())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_candidacy(
        &self,
        candidacy: CandidacyId,
        fields: &CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, BackendError> {
        Ok(query_as::<Postgres, CandidacyRecord>(UPDATE_CANDIDACY_SQL)
            .bind(candidacy.get())
            .bind(&fields.proposal)
            .bind(fields.user_id.get())
            .bind(fields.election_id.get())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_candidacy(&self, candidacy: CandidacyId) -> Result<u64, BackendError> {
        let rows_affected = query(DELETE_CANDIDACY_SQL)
            .bind(candidacy.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CandidacyRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: CandidacyId::new(row.try_get("id")?),
            proposal: row.try_get("proposal")?,
            user_id: UserId::new(row.try_get("user_id")?),
            election_id: ElectionId::new(row.try_get("election_id")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CandidacyListing {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            candidacy: CandidacyRecord::from_row(row)?,
            username: row.try_get("username")?,
            election_name: row.try_get("election_name")?,
        })
    }
}
