//! Login sessions.
//!
//! A [`Session`] is created by [`SessionManager::login`], persisted through a
//! [`KeyValueStore`] and handed to every operation that needs an [`Actor`].
//! Logging out removes it from storage; nothing else caches the current user.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    domain::{
        profiles::{records::ProfileRecord, repository::ProfilesRepository},
        users::{
            password::verify_password,
            records::{Actor, Role, UserId, UserRecord},
            repository::UsersRepository,
        },
    },
    errors::{BackendError, ErrorKind},
    storage::{KeyValueStore, StorageError},
};

/// Storage key of the logged-in user.
pub const USER_KEY: &str = "usuario";

/// Storage key of the logged-in user's profile.
pub const PROFILE_KEY: &str = "profile";

/// Login and session storage failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Blank username or empty password.
    #[error("username and password are required")]
    MissingCredentials,

    /// No user has the given username.
    #[error("user not found")]
    UnknownUser,

    /// The password hash does not match.
    #[error("wrong password")]
    WrongPassword,

    /// No session is stored.
    #[error("not logged in")]
    NotLoggedIn,

    /// The session store failed.
    #[error("session storage error")]
    Storage(#[from] StorageError),

    /// The stored session could not be decoded.
    #[error("stored session is malformed")]
    Malformed(#[from] serde_json::Error),

    /// A repository failed.
    #[error("backend error")]
    Backend(#[from] BackendError),
}

impl SessionError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredentials => ErrorKind::Validation,
            Self::UnknownUser => ErrorKind::NotFound,
            Self::WrongPassword | Self::NotLoggedIn => ErrorKind::Unauthorized,
            Self::Storage(_) | Self::Malformed(_) => ErrorKind::Backend,
            Self::Backend(error) => error.kind(),
        }
    }
}

/// The logged-in user as persisted under [`USER_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User id.
    pub id: UserId,
    /// Identification number.
    pub identification: String,
    /// Login name.
    pub username: String,
    /// Access role.
    pub role: Role,
}

impl From<&UserRecord> for SessionUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            identification: user.identification.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Logged-in user and the profile cached alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Who is logged in.
    pub user: SessionUser,
    /// Cached profile, if one was saved.
    pub profile: Option<ProfileRecord>,
}

impl Session {
    /// Identity passed to service operations.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user.id,
            role: self.user.role,
        }
    }
}

/// Logs users in and out and restores the stored session.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UsersRepository>,
    profiles: Arc<dyn ProfilesRepository>,
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Manager checking credentials against `users` and persisting to `store`.
    #[must_use]
    pub fn new(
        users: Arc<dyn UsersRepository>,
        profiles: Arc<dyn ProfilesRepository>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            users,
            profiles,
            store,
        }
    }

    /// Checks credentials and persists the resulting session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredentials`] for a blank username or an
    /// empty password, [`SessionError::UnknownUser`] when no user has that
    /// username and [`SessionError::WrongPassword`] when the hash differs.
    #[tracing::instrument(name = "session.login", skip(self, password), err)]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, SessionError> {
        let username = username.trim();

        if username.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let user = self
            .users
            .find_user_by_username(username)
            .await?
            .ok_or(SessionError::UnknownUser)?;

        if !verify_password(password, &user.password_hash) {
            return Err(SessionError::WrongPassword);
        }

        let profile = self.profiles.get_profile(user.id).await?;

        match &profile {
            Some(profile) => {
                self.store
                    .set(PROFILE_KEY, &serde_json::to_string(profile)?)
                    .await?;
            }
            None => self.store.remove(PROFILE_KEY).await?,
        }

        let session_user = SessionUser::from(&user);

        self.store
            .set(USER_KEY, &serde_json::to_string(&session_user)?)
            .await?;

        info!(user_id = %user.id, role = %user.role, "logged in");

        Ok(Session {
            user: session_user,
            profile,
        })
    }

    /// The persisted session, if someone is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error when storage cannot be read or holds malformed data.
    pub async fn restore(&self) -> Result<Option<Session>, SessionError> {
        let Some(user) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };

        let user: SessionUser = serde_json::from_str(&user)?;

        let profile = match self.store.get(PROFILE_KEY).await? {
            Some(profile) => Some(serde_json::from_str(&profile)?),
            None => None,
        };

        Ok(Some(Session { user, profile }))
    }

    /// Like [`SessionManager::restore`], but a missing session is an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotLoggedIn`] when no session is stored.
    pub async fn require(&self) -> Result<Session, SessionError> {
        self.restore().await?.ok_or(SessionError::NotLoggedIn)
    }

    /// Replaces the cached profile after the user edits it.
    ///
    /// # Errors
    ///
    /// Returns an error when storage cannot be written.
    pub async fn cache_profile(&self, profile: &ProfileRecord) -> Result<(), SessionError> {
        self.store
            .set(PROFILE_KEY, &serde_json::to_string(profile)?)
            .await?;

        Ok(())
    }

    /// Forgets the current session.
    ///
    /// # Errors
    ///
    /// Returns an error when storage cannot be written.
    #[tracing::instrument(name = "session.logout", skip(self), err)]
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(USER_KEY).await?;
        self.store.remove(PROFILE_KEY).await?;

        info!("logged out");

        Ok(())
    }
}
