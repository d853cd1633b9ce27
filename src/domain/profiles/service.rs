//! Profiles service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::domain::{
    profiles::{
        data::{ProfileRow, ProfileUpdate},
        errors::ProfilesServiceError,
        records::ProfileRecord,
        repository::{PgProfilesRepository, ProfilesRepository},
    },
    users::records::{Actor, UserId},
};

/// Profile service over a [`ProfilesRepository`].
#[derive(Clone)]
pub struct ProfilesManager {
    repository: Arc<dyn ProfilesRepository>,
}

impl fmt::Debug for ProfilesManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilesManager")
            .finish_non_exhaustive()
    }
}

impl ProfilesManager {
    /// Creates a manager over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn ProfilesRepository>) -> Self {
        Self { repository }
    }

    /// Creates a manager backed by PostgreSQL.
    #[must_use]
    pub fn pg(pool: PgPool) -> Self {
        Self::new(Arc::new(PgProfilesRepository::new(pool)))
    }
}

fn ensure_own_profile(actor: Actor, user: UserId) -> Result<(), ProfilesServiceError> {
    if actor.id == user || actor.role.manages_users() {
        Ok(())
    } else {
        Err(ProfilesServiceError::Unauthorized(
            "profiles can only be edited by their owner",
        ))
    }
}

fn validate(update: ProfileUpdate) -> Result<ProfileRow, ProfilesServiceError> {
    if update.age <= 0 {
        return Err(ProfilesServiceError::Validation(
            "age must be greater than zero",
        ));
    }

    let gender = update
        .gender
        .stored_value()
        .ok_or(ProfilesServiceError::Validation("custom gender cannot be empty"))?;

    Ok(ProfileRow {
        first_name: update.first_name.trim().to_string(),
        last_name: update.last_name.trim().to_string(),
        age: update.age,
        gender,
    })
}

#[async_trait]
impl ProfilesService for ProfilesManager {
    #[tracing::instrument(
        name = "profiles.service.get_profile",
        skip(self),
        fields(user_id = %user),
        err
    )]
    async fn get_profile(
        &self,
        user: UserId,
    ) -> Result<Option<ProfileRecord>, ProfilesServiceError> {
        Ok(self.repository.get_profile(user).await?)
    }

    #[tracing::instrument(
        name = "profiles.service.upsert_profile",
        skip(self, update),
        fields(actor = %actor.id, user_id = %user),
        err
    )]
    async fn upsert_profile(
        &self,
        actor: Actor,
        user: UserId,
        update: ProfileUpdate,
    ) -> Result<ProfileRecord, ProfilesServiceError> {
        ensure_own_profile(actor, user)?;

        let row = validate(update)?;
        let profile = self.repository.upsert_profile(user, &row).await?;

        info!(user_id = %user, "saved profile");

        Ok(profile)
    }
}

/// Per-user profile data.
#[automock]
#[async_trait]
pub trait ProfilesService: Send + Sync {
    /// The profile of `user`, if one was saved.
    async fn get_profile(
        &self,
        user: UserId,
    ) -> Result<Option<ProfileRecord>, ProfilesServiceError>;

    /// Creates or replaces the profile of `user`.
    async fn upsert_profile(
        &self,
        actor: Actor,
        user: UserId,
        update: ProfileUpdate,
    ) -> Result<ProfileRecord, ProfilesServiceError>;
}
