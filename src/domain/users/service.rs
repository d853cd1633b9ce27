//! Users service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::{
    domain::users::{
        data::{NewUser, NewUserRow, UserChanges, UserUpdate},
        errors::UsersServiceError,
        password::hash_password,
        records::{Actor, Role, UserId, UserRecord},
        repository::{PgUsersRepository, UsersRepository},
    },
    errors::BackendError,
};

/// User service over a [`UsersRepository`].
#[derive(Clone)]
pub struct UsersManager {
    repository: Arc<dyn UsersRepository>,
}

impl fmt::Debug for UsersManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsersManager")
            .finish_non_exhaustive()
    }
}

impl UsersManager {
    /// Creates a manager over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn UsersRepository>) -> Self {
        Self { repository }
    }

    /// Creates a manager backed by PostgreSQL.
    #[must_use]
    pub fn pg(pool: PgPool) -> Self {
        Self::new(Arc::new(PgUsersRepository::new(pool)))
    }
}

fn required(value: &str, message: &'static str) -> Result<String, UsersServiceError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(UsersServiceError::Validation(message));
    }

    Ok(value.to_string())
}

fn ensure_user_manager(actor: Actor) -> Result<(), UsersServiceError> {
    if actor.role.manages_users() {
        Ok(())
    } else {
        Err(UsersServiceError::Unauthorized("only ADMIN users may manage users"))
    }
}

#[async_trait]
impl UsersService for UsersManager {
    #[tracing::instrument(name = "users.service.list_users", skip(self), fields(actor = %actor.id), err)]
    async fn list_users(&self, actor: Actor) -> Result<Vec<UserRecord>, UsersServiceError> {
        ensure_user_manager(actor)?;

        Ok(self.repository.list_users().await?)
    }

    #[tracing::instrument(name = "users.service.list_candidates", skip(self), fields(actor = %actor.id), err)]
    async fn list_candidates(&self, actor: Actor) -> Result<Vec<UserRecord>, UsersServiceError> {
        if !actor.role.manages_elections() {
            return Err(UsersServiceError::Unauthorized(
                "only ADMIN or ADMINISTRATIVO users may nominate candidates",
            ));
        }

        Ok(self.repository.list_users_by_role(Role::Candidato).await?)
    }

    #[tracing::instrument(
        name = "users.service.create_user",
        skip(self, user),
        fields(actor = %actor.id, role = %user.role),
        err
    )]
    async fn create_user(
        &self,
        actor: Actor,
        user: NewUser,
    ) -> Result<UserRecord, UsersServiceError> {
        // Checked before the caller's role: no one creates ADMIN accounts here.
        if user.role == Role::Admin {
            return Err(UsersServiceError::Unauthorized(
                "users with role ADMIN cannot be created",
            ));
        }

        ensure_user_manager(actor)?;

        let row = NewUserRow {
            identification: required(&user.identification, "identification is required")?,
            username: required(&user.username, "username is required")?,
            password_hash: {
                if user.password.is_empty() {
                    return Err(UsersServiceError::Validation(
                        "password is required for new users",
                    ));
                }

                hash_password(&user.password)
            },
            role: user.role,
        };

        let created = self.repository.create_user(&row).await?;

        info!(user_id = %created.id, "created user");

        Ok(created)
    }

    #[tracing::instrument(
        name = "users.service.update_user",
        skip(self, update),
        fields(actor = %actor.id, user_id = %user),
        err
    )]
    async fn update_user(
        &self,
        actor: Actor,
        user: UserId,
        update: UserUpdate,
    ) -> Result<UserRecord, UsersServiceError> {
        ensure_user_manager(actor)?;

        if update.role == Role::Admin {
            return Err(UsersServiceError::Unauthorized(
                "users cannot be promoted to ADMIN",
            ));
        }

        let changes = UserChanges {
            identification: required(&update.identification, "identification is required")?,
            username: required(&update.username, "username is required")?,
            password_hash: update
                .password
                .as_deref()
                .filter(|password| !password.is_empty())
                .map(hash_password),
            role: update.role,
        };

        let existing = self.repository.get_user(user).await?;

        if existing.role == Role::Admin {
            return Err(UsersServiceError::Unauthorized(
                "ADMIN users cannot be edited",
            ));
        }

        let updated = self.repository.update_user(user, &changes).await?;

        info!(user_id = %updated.id, "updated user");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "users.service.delete_user",
        skip(self),
        fields(actor = %actor.id, user_id = %user),
        err
    )]
    async fn delete_user(&self, actor: Actor, user: UserId) -> Result<(), UsersServiceError> {
        ensure_user_manager(actor)?;

        let existing = self.repository.get_user(user).await?;

        if existing.role == Role::Admin {
            return Err(UsersServiceError::Unauthorized(
                "ADMIN users cannot be deleted",
            ));
        }

        let deleted = self
            .repository
            .delete_user(user)
            .await
            .map_err(|error| match error {
                BackendError::InvalidReference => UsersServiceError::StillReferenced,
                error => error.into(),
            })?;

        if deleted == 0 {
            return Err(UsersServiceError::NotFound);
        }

        info!(user_id = %user, "deleted user");

        Ok(())
    }

    #[tracing::instrument(name = "users.service.bootstrap_admin", skip(self, password), err)]
    async fn bootstrap_admin(
        &self,
        identification: String,
        username: String,
        password: String,
    ) -> Result<Option<UserRecord>, UsersServiceError> {
        let username = required(&username, "username is required")?;

        if self
            .repository
            .find_user_by_username(&username)
            .await?
            .is_some()
        {
            info!(%username, "admin user already exists");

            return Ok(None);
        }

        if password.is_empty() {
            return Err(UsersServiceError::Validation("password is required"));
        }

        let created = self
            .repository
            .create_user(&NewUserRow {
                identification: required(&identification, "identification is required")?,
                username,
                password_hash: hash_password(&password),
                role: Role::Admin,
            })
            .await?;

        info!(user_id = %created.id, "bootstrapped admin user");

        Ok(Some(created))
    }
}

/// User management operations.
#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Lists every user. ADMIN only.
    async fn list_users(&self, actor: Actor) -> Result<Vec<UserRecord>, UsersServiceError>;

    /// Lists users with role CANDIDATO, the pool candidacies are drawn from.
    async fn list_candidates(&self, actor: Actor) -> Result<Vec<UserRecord>, UsersServiceError>;

    /// Creates a non-ADMIN user.
    async fn create_user(
        &self,
        actor: Actor,
        user: NewUser,
    ) -> Result<UserRecord, UsersServiceError>;

    /// Edits a non-ADMIN user.
    async fn update_user(
        &self,
        actor: Actor,
        user: UserId,
        update: UserUpdate,
    ) -> Result<UserRecord, UsersServiceError>;

    /// Deletes a non-ADMIN user.
    async fn delete_user(&self, actor: Actor, user: UserId) -> Result<(), UsersServiceError>;

    /// Seeds the first ADMIN account; returns `None` when the username is already taken.
    ///
    /// This is the only path that creates ADMIN users and is not reachable from the
    /// management operations above.
    async fn bootstrap_admin(
        &self,
        identification: String,
        username: String,
        password: String,
    ) -> Result<Option<UserRecord>, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::{
        domain::users::{password::verify_password, repository::MockUsersRepository},
        errors::{BackendError, ErrorKind},
    };

    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: UserId::new(1),
            role,
        }
    }

    fn user(id: i64, role: Role) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            identification: format!("ID-{id}"),
            username: format!("user{id}"),
            password_hash: hash_password("pw"),
            role,
        }
    }

    fn new_user(role: Role) -> NewUser {
        NewUser {
            identification: "12345678".to_string(),
            username: "maria".to_string(),
            password: "clave".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn create_admin_is_unauthorized_for_every_caller_role() {
        for role in Role::ALL {
            // No expectations: any repository call would panic.
            let svc = UsersManager::new(Arc::new(MockUsersRepository::new()));

            let result = svc.create_user(actor(role), new_user(Role::Admin)).await;

            assert!(
                matches!(result, Err(UsersServiceError::Unauthorized(_))),
                "expected Unauthorized for caller {role}, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn create_user_requires_admin_caller() {
        let svc = UsersManager::new(Arc::new(MockUsersRepository::new()));

        let result = svc
            .create_user(actor(Role::Administrativo), new_user(Role::Votante))
            .await;

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::Unauthorized)
        );
    }

    #[tokio::test]
    async fn create_user_hashes_password_and_trims_fields() -> TestResult {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_create_user()
            .withf(|row| {
                row.username == "maria"
                    && row.identification == "12345678"
                    && verify_password("clave", &row.password_hash)
            })
            .times(1)
            .returning(|row| {
                Ok(UserRecord {
                    id: UserId::new(7),
                    identification: row.identification.clone(),
                    username: row.username.clone(),
                    password_hash: row.password_hash.clone(),
                    role: row.role,
                })
            });

        let svc = UsersManager::new(Arc::new(repository));

        let mut input = new_user(Role::Candidato);
        input.username = "  maria ".to_string();

        let created = svc.create_user(actor(Role::Admin), input).await?;

        assert_eq!(created.id, UserId::new(7));
        assert_eq!(created.role, Role::Candidato);

        Ok(())
    }

    #[tokio::test]
    async fn create_user_without_password_is_a_validation_error() {
        let svc = UsersManager::new(Arc::new(MockUsersRepository::new()));

        let mut input = new_user(Role::Votante);
        input.password = String::new();

        let result = svc.create_user(actor(Role::Admin), input).await;

        assert!(
            matches!(result, Err(UsersServiceError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_create_user()
            .returning(|_| Err(BackendError::AlreadyExists));

        let svc = UsersManager::new(Arc::new(repository));

        let result = svc
            .create_user(actor(Role::Admin), new_user(Role::Votante))
            .await;

        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn admin_users_cannot_be_edited() {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_get_user()
            .with(eq(UserId::new(2)))
            .returning(|id| Ok(user(id.get(), Role::Admin)));

        let svc = UsersManager::new(Arc::new(repository));

        let result = svc
            .update_user(
                actor(Role::Admin),
                UserId::new(2),
                UserUpdate {
                    identification: "1".to_string(),
                    username: "root".to_string(),
                    password: None,
                    role: Role::Administrativo,
                },
            )
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::Unauthorized(_))),
            "expected Unauthorized, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_without_password_keeps_stored_hash() -> TestResult {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_get_user()
            .returning(|id| Ok(user(id.get(), Role::Votante)));

        repository
            .expect_update_user()
            .withf(|_, changes| changes.password_hash.is_none() && changes.username == "nuevo")
            .times(1)
            .returning(|id, changes| {
                let mut record = user(id.get(), changes.role);
                record.username.clone_from(&changes.username);
                Ok(record)
            });

        let svc = UsersManager::new(Arc::new(repository));

        let updated = svc
            .update_user(
                actor(Role::Admin),
                UserId::new(3),
                UserUpdate {
                    identification: "3".to_string(),
                    username: "nuevo".to_string(),
                    password: Some(String::new()),
                    role: Role::Candidato,
                },
            )
            .await?;

        assert_eq!(updated.username, "nuevo");
        assert_eq!(updated.role, Role::Candidato);

        Ok(())
    }

    #[tokio::test]
    async fn admin_users_cannot_be_deleted() {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_get_user()
            .returning(|id| Ok(user(id.get(), Role::Admin)));

        let svc = UsersManager::new(Arc::new(repository));

        let result = svc.delete_user(actor(Role::Admin), UserId::new(1)).await;

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::Unauthorized)
        );
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_get_user()
            .returning(|_| Err(BackendError::NotFound));

        let svc = UsersManager::new(Arc::new(repository));

        let result = svc.delete_user(actor(Role::Admin), UserId::new(99)).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn user_with_votes_cannot_be_deleted() {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_get_user()
            .returning(|id| Ok(user(id.get(), Role::Votante)));
        repository
            .expect_delete_user()
            .returning(|_| Err(BackendError::InvalidReference));

        let svc = UsersManager::new(Arc::new(repository));

        let result = svc.delete_user(actor(Role::Admin), UserId::new(8)).await;

        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn bootstrap_admin_skips_existing_username() -> TestResult {
        let mut repository = MockUsersRepository::new();

        repository
            .expect_find_user_by_username()
            .withf(|username| username == "admin5")
            .returning(|_| Ok(Some(user(1, Role::Admin))));

        let svc = UsersManager::new(Arc::new(repository));

        let created = svc
            .bootstrap_admin("12345678".to_string(), "admin5".to_string(), "1234".to_string())
            .await?;

        assert!(created.is_none());

        Ok(())
    }
}
