//! Profiles Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    domain::{
        profiles::{data::ProfileRow, records::ProfileRecord},
        users::records::UserId,
    },
    errors::BackendError,
};

const GET_PROFILE_SQL: &str = include_str!("sql/get_profile.sql");
const UPSERT_PROFILE_SQL: &str = include_str!("sql/upsert_profile.sql");

/// Backend access to the `user_profiles` table.
#[automock]
#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    /// The profile of `user`, if one was saved.
    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRecord>, BackendError>;

    /// Inserts the profile of `user`, or replaces it when one exists.
    async fn upsert_profile(
        &self,
        user: UserId,
        profile: &ProfileRow,
    ) -> Result<ProfileRecord, BackendError>;
}

/// PostgreSQL-backed profiles repository.
#[derive(Debug, Clone)]
pub struct PgProfilesRepository {
    pool: PgPool,
}

impl PgProfilesRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfilesRepository for PgProfilesRepository {
    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRecord>, BackendError> {
        Ok(query_as::<Postgres, ProfileRecord>(GET_PROFILE_SQL)
            .bind(user.get())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn upsert_profile(
        &self,
        user: UserId,
        profile: &ProfileRow,
    ) -> Result<ProfileRecord, BackendError> {
        Ok(query_as::<Postgres, ProfileRecord>(UPSERT_PROFILE_SQL)
            .bind(user.get())
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(profile.age)
            .bind(&profile.gender)
            .fetch_one(&self.pool)
            .await?)
    }
}

impl<'r> FromRow<'r, PgRow> for ProfileRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_id: UserId::new(row.try_get("user_id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            age: row.try_get("age")?,
            gender: row.try_get("gender")?,
        })
    }
}
