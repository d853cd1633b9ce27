//! Elections Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::elections::{
        data::{ElectionFields, ElectionFilter, StartOrder},
        records::{ElectionId, ElectionRecord, ElectionState},
    },
    errors::{BackendError, UnknownVariant},
};

const LIST_ELECTIONS_ASCENDING_SQL: &str = include_str!("sql/list_elections_ascending.sql");
const LIST_ELECTIONS_DESCENDING_SQL: &str = include_str!("sql/list_elections_descending.sql");
const GET_ELECTION_SQL: &str = include_str!("sql/get_election.sql");
const CREATE_ELECTION_SQL: &str = include_str!("sql/create_election.sql");
const UPDATE_ELECTION_SQL: &str = include_str!("sql/update_election.sql");
const UPDATE_ELECTION_STATE_SQL: &str = include_str!("sql/update_election_state.sql");
const DELETE_ELECTION_SQL: &str = include_str!("sql/delete_election.sql");

/// Backend access to the `elections` table.
#[automock]
#[async_trait]
pub trait ElectionsRepository: Send + Sync {
    /// Elections matching `filter`, sorted by start date.
    async fn list_elections(
        &self,
        filter: &ElectionFilter,
    ) -> Result<Vec<ElectionRecord>, BackendError>;

    /// Fails with [`BackendError::NotFound`] for an unknown id.
    async fn get_election(&self, election: ElectionId) -> Result<ElectionRecord, BackendError>;

    /// Inserts with both timestamps set to `now`.
    async fn create_election(
        &self,
        fields: &ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, BackendError>;

    /// Replaces every editable field and stamps `updated_at`.
    async fn update_election(
        &self,
        election: ElectionId,
        fields: &ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, BackendError>;

    /// Persists a resolved lifecycle state; returns the number of updated rows.
    async fn update_election_state(
        &self,
        election: ElectionId,
        state: ElectionState,
    ) -> Result<u64, BackendError>;

    /// Returns the number of deleted rows. Fails with
    /// [`BackendError::InvalidReference`] while candidacies or votes point at it.
    async fn delete_election(&self, election: ElectionId) -> Result<u64, BackendError>;
}

/// PostgreSQL-backed elections repository.
#[derive(Debug, Clone)]
pub struct PgElectionsRepository {
    pool: PgPool,
}

impl PgElectionsRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ElectionsRepository for PgElectionsRepository {
    async fn list_elections(
        &self,
        filter: &ElectionFilter,
    ) -> Result<Vec<ElectionRecord>, BackendError> {
        let sql = match filter.order {
            StartOrder::Ascending => LIST_ELECTIONS_ASCENDING_SQL,
            StartOrder::Descending => LIST_ELECTIONS_DESCENDING_SQL,
        };

        let states: Option<Vec<&str>> = filter
            .states
            .as_ref()
            .map(|states| states.iter().map(|state| state.as_str()).collect());

        Ok(query_as::<Postgres, ElectionRecord>(sql)
            .bind(states)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_election(&self, election: ElectionId) -> Result<ElectionRecord, BackendError> {
        Ok(query_as::<Postgres, ElectionRecord>(GET_ELECTION_SQL)
            .bind(election.get())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn create_election(
        &self,
        fields: &ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, BackendError> {
        Ok(query_as::<Postgres, ElectionRecord>(CREATE_ELECTION_SQL)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(&fields.representation_type)
            .bind(SqlxTimestamp::from(fields.start_date))
            .bind(SqlxTimestamp::from(fields.end_date))
            .bind(fields.state.as_str())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_election(
        &self,
        election: ElectionId,
        fields: &ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, BackendError> {
        Ok(query_as::<Postgres, ElectionRecord>(UPDATE_ELECTION_SQL)
            .bind(election.get())
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(&fields.representation_type)
            .bind(SqlxTimestamp::from(fields.start_date))
            .bind(SqlxTimestamp::from(fields.end_date))
            .bind(fields.state.as_str())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_election_state(
        &self,
        election: ElectionId,
        state: ElectionState,
    ) -> Result<u64, BackendError> {
        let rows_affected = query(UPDATE_ELECTION_STATE_SQL)
            .bind(election.get())
            .bind(state.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_election(&self, election: ElectionId) -> Result<u64, BackendError> {
        let rows_affected = query(DELETE_ELECTION_SQL)
            .bind(election.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ElectionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let state: String = row.try_get("state")?;

        Ok(Self {
            id: ElectionId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            representation_type: row.try_get("representation_type")?,
            start_date: row.try_get::<SqlxTimestamp, _>("start_date")?.to_jiff(),
            end_date: row.try_get::<SqlxTimestamp, _>("end_date")?.to_jiff(),
            state: state
                .parse()
                .map_err(UnknownVariant::into_decode_error)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
