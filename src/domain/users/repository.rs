//! Users Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::users::{
        data::{NewUserRow, UserChanges},
        records::{Role, UserId, UserRecord},
    },
    errors::{BackendError, UnknownVariant},
};

const LIST_USERS_SQL: &str = include_str!("sql/list_users.sql");
const LIST_USERS_BY_ROLE_SQL: &str = include_str!("sql/list_users_by_role.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const FIND_USER_BY_USERNAME_SQL: &str = include_str!("sql/find_user_by_username.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const UPDATE_USER_SQL: &str = include_str!("sql/update_user.sql");
const DELETE_USER_SQL: &str = include_str!("sql/delete_user.sql");

/// Backend access to the `users` table.
#[automock]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Every user, by id.
    async fn list_users(&self) -> Result<Vec<UserRecord>, BackendError>;

    /// Users holding `role`, by id.
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<UserRecord>, BackendError>;

    /// Fails with [`BackendError::NotFound`] for an unknown id.
    async fn get_user(&self, user: UserId) -> Result<UserRecord, BackendError>;

    /// Exact, case-sensitive username lookup.
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, BackendError>;

    /// Inserts a user. A taken username fails with [`BackendError::AlreadyExists`].
    async fn create_user(&self, user: &NewUserRow) -> Result<UserRecord, BackendError>;

    /// Fails with [`BackendError::NotFound`] for an unknown id.
    async fn update_user(
        &self,
        user: UserId,
        changes: &UserChanges,
    ) -> Result<UserRecord, BackendError>;

    /// Returns the number of deleted rows. Fails with
    /// [`BackendError::InvalidReference`] while candidacies or votes point at it.
    async fn delete_user(&self, user: UserId) -> Result<u64, BackendError>;
}

/// PostgreSQL-backed users repository.
#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn list_users(&self) -> Result<Vec<UserRecord>, BackendError> {
        Ok(query_as::<Postgres, UserRecord>(LIST_USERS_SQL)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<UserRecord>, BackendError> {
        Ok(query_as::<Postgres, UserRecord>(LIST_USERS_BY_ROLE_SQL)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_user(&self, user: UserId) -> Result<UserRecord, BackendError> {
        Ok(query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.get())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, BackendError> {
        Ok(query_as::<Postgres, UserRecord>(FIND_USER_BY_USERNAME_SQL)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: &NewUserRow) -> Result<UserRecord, BackendError> {
        Ok(query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(&user.identification)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_user(
        &self,
        user: UserId,
        changes: &UserChanges,
    ) -> Result<UserRecord, BackendError> {
        Ok(query_as::<Postgres, UserRecord>(UPDATE_USER_SQL)
            .bind(user.get())
            .bind(&changes.identification)
            .bind(&changes.username)
            .bind(changes.role.as_str())
            .bind(changes.password_hash.as_deref())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_user(&self, user: UserId) -> Result<u64, BackendError> {
        let rows_affected = query(DELETE_USER_SQL)
            .bind(user.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        Ok(Self {
            id: UserId::new(row.try_get("id")?),
            identification: row.try_get("identification")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: role
                .parse()
                .map_err(UnknownVariant::into_decode_error)?,
        })
    }
}
