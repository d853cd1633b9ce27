//! Candidacies service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::{
    domain::{
        candidacies::{
            data::CandidacyFields,
            errors::CandidaciesServiceError,
            records::{CandidacyId, CandidacyListing, CandidacyRecord},
            repository::{CandidaciesRepository, PgCandidaciesRepository},
        },
        elections::records::ElectionId,
        users::records::Actor,
    },
    errors::BackendError,
};

/// Candidacy service over a [`CandidaciesRepository`].
#[derive(Clone)]
pub struct CandidaciesManager {
    repository: Arc<dyn CandidaciesRepository>,
}

impl fmt::Debug for CandidaciesManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidaciesManager")
            .finish_non_exhaustive()
    }
}

impl CandidaciesManager {
    /// Creates a manager over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn CandidaciesRepository>) -> Self {
        Self { repository }
    }

    /// Creates a manager backed by PostgreSQL.
    #[must_use]
    pub fn pg(pool: PgPool) -> Self {
        Self::new(Arc::new(PgCandidaciesRepository::new(pool)))
    }
}

fn ensure_candidacy_manager(actor: Actor) -> Result<(), CandidaciesServiceError> {
    if actor.role.manages_elections() {
        Ok(())
    } else {
        Err(CandidaciesServiceError::Unauthorized(
            "only ADMIN or ADMINISTRATIVO users may manage candidacies",
        ))
    }
}

fn validate(fields: CandidacyFields) -> Result<CandidacyFields, CandidaciesServiceError> {
    let proposal = fields.proposal.trim();

    if proposal.is_empty() {
        return Err(CandidaciesServiceError::Validation(
            "proposal cannot be empty",
        ));
    }

    Ok(CandidacyFields {
        proposal: proposal.to_string(),
        ..fields
    })
}

#[async_trait]
impl CandidaciesService for CandidaciesManager {
    #[tracing::instrument(name = "candidacies.service.list_candidacies", skip(self), err)]
    async fn list_candidacies(
        &self,
        election: Option<ElectionId>,
    ) -> Result<Vec<CandidacyListing>, CandidaciesServiceError> {
        Ok(self.repository.list_candidacies(election).await?)
    }

    #[tracing::instrument(
        name = "candidacies.service.create_candidacy",
        skip(self, fields),
        fields(
            actor = %actor.id,
            user_id = %fields.user_id,
            election_id = %fields.election_id
        ),
        err
    )]
    async fn create_candidacy(
        &self,
        actor: Actor,
        fields: CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, CandidaciesServiceError> {
        ensure_candidacy_manager(actor)?;

        let fields = validate(fields)?;
        let created = self.repository.create_candidacy(&fields, now).await?;

        info!(candidacy_id = %created.id, "created candidacy");

        Ok(created)
    }

    #[tracing::instrument(
        name = "candidacies.service.update_candidacy",
        skip(self, fields),
        fields(actor = %actor.id, candidacy_id = %candidacy),
        err
    )]
    async fn update_candidacy(
        &self,
        actor: Actor,
        candidacy: CandidacyId,
        fields: CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, CandidaciesServiceError> {
        ensure_candidacy_manager(actor)?;

        let fields = validate(fields)?;
        let updated = self
            .repository
            .update_candidacy(candidacy, &fields, now)
            .await?;

        info!(candidacy_id = %updated.id, "updated candidacy");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "candidacies.service.delete_candidacy",
        skip(self),
        fields(actor = %actor.id, candidacy_id = %candidacy),
        err
    )]
    async fn delete_candidacy(
        &self,
        actor: Actor,
        candidacy: CandidacyId,
    ) -> Result<(), CandidaciesServiceError> {
        ensure_candidacy_manager(actor)?;

        let deleted = self
            .repository
            .delete_candidacy(candidacy)
            .await
            .map_err(|error| match error {
                BackendError::InvalidReference => CandidaciesServiceError::HasVotes,
                error => error.into(),
            })?;

        if deleted == 0 {
            return Err(CandidaciesServiceError::NotFound);
        }

        info!(candidacy_id = %candidacy, "deleted candidacy");

        Ok(())
    }
}

/// Candidacy management.
#[automock]
#[async_trait]
pub trait CandidaciesService: Send + Sync {
    /// Lists candidacies with nominee and election names; `None` lists all elections.
    async fn list_candidacies(
        &self,
        election: Option<ElectionId>,
    ) -> Result<Vec<CandidacyListing>, CandidaciesServiceError>;

    /// Nominates a user. The same user may be nominated to an election more than once.
    async fn create_candidacy(
        &self,
        actor: Actor,
        fields: CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, CandidaciesServiceError>;

    /// Replaces the nominee, election and proposal of a candidacy.
    async fn update_candidacy(
        &self,
        actor: Actor,
        candidacy: CandidacyId,
        fields: CandidacyFields,
        now: Timestamp,
    ) -> Result<CandidacyRecord, CandidaciesServiceError>;

    /// Removes a candidacy that has no votes.
    async fn delete_candidacy(
        &self,
        actor: Actor,
        candidacy: CandidacyId,
    ) -> Result<(), CandidaciesServiceError>;
}
