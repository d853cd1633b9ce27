//! Elections service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{error, info};

use crate::{
    domain::{
        elections::{
            data::{ElectionFields, ElectionFilter},
            errors::ElectionsServiceError,
            records::{ElectionId, ElectionRecord, ElectionState},
            repository::{ElectionsRepository, PgElectionsRepository},
            state::resolve_state,
        },
        users::records::Actor,
    },
    errors::BackendError,
};

/// Election service over an [`ElectionsRepository`].
#[derive(Clone)]
pub struct ElectionsManager {
    repository: Arc<dyn ElectionsRepository>,
}

impl fmt::Debug for ElectionsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElectionsManager")
            .finish_non_exhaustive()
    }
}

impl ElectionsManager {
    /// Creates a manager over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn ElectionsRepository>) -> Self {
        Self { repository }
    }

    /// Creates a manager backed by PostgreSQL.
    #[must_use]
    pub fn pg(pool: PgPool) -> Self {
        Self::new(Arc::new(PgElectionsRepository::new(pool)))
    }
}

fn ensure_election_manager(actor: Actor) -> Result<(), ElectionsServiceError> {
    if actor.role.manages_elections() {
        Ok(())
    } else {
        Err(ElectionsServiceError::Unauthorized(
            "only ADMIN or ADMINISTRATIVO users may manage elections",
        ))
    }
}

fn validate(fields: ElectionFields) -> Result<ElectionFields, ElectionsServiceError> {
    let name = fields.name.trim();
    let description = fields.description.trim();
    let representation_type = fields.representation_type.trim();

    if name.is_empty() || description.is_empty() || representation_type.is_empty() {
        return Err(ElectionsServiceError::Validation(
            "name, description and representation type are required",
        ));
    }

    if fields.end_date < fields.start_date {
        return Err(ElectionsServiceError::Validation(
            "end date must not be before start date",
        ));
    }

    Ok(ElectionFields {
        name: name.to_string(),
        description: description.to_string(),
        representation_type: representation_type.to_string(),
        ..fields
    })
}

#[async_trait]
impl ElectionsService for ElectionsManager {
    #[tracing::instrument(
        name = "elections.service.list_elections",
        skip(self),
        fields(order = ?filter.order),
        err
    )]
    async fn list_elections(
        &self,
        filter: ElectionFilter,
    ) -> Result<Vec<ElectionRecord>, ElectionsServiceError> {
        Ok(self.repository.list_elections(&filter).await?)
    }

    #[tracing::instrument(
        name = "elections.service.get_election",
        skip(self),
        fields(election_id = %election),
        err
    )]
    async fn get_election(
        &self,
        election: ElectionId,
    ) -> Result<ElectionRecord, ElectionsServiceError> {
        Ok(self.repository.get_election(election).await?)
    }

    #[tracing::instrument(
        name = "elections.service.create_election",
        skip(self, fields),
        fields(actor = %actor.id),
        err
    )]
    async fn create_election(
        &self,
        actor: Actor,
        fields: ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, ElectionsServiceError> {
        ensure_election_manager(actor)?;

        let fields = validate(fields)?;
        let created = self.repository.create_election(&fields, now).await?;

        info!(election_id = %created.id, state = %created.state, "created election");

        Ok(created)
    }

    #[tracing::instrument(
        name = "elections.service.update_election",
        skip(self, fields),
        fields(actor = %actor.id, election_id = %election),
        err
    )]
    async fn update_election(
        &self,
        actor: Actor,
        election: ElectionId,
        fields: ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, ElectionsServiceError> {
        ensure_election_manager(actor)?;

        let fields = validate(fields)?;
        let updated = self
            .repository
            .update_election(election, &fields, now)
            .await?;

        info!(election_id = %updated.id, "updated election");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "elections.service.delete_election",
        skip(self),
        fields(actor = %actor.id, election_id = %election),
        err
    )]
    async fn delete_election(
        &self,
        actor: Actor,
        election: ElectionId,
    ) -> Result<(), ElectionsServiceError> {
        ensure_election_manager(actor)?;

        let deleted = self
            .repository
            .delete_election(election)
            .await
            .map_err(|error| match error {
                BackendError::InvalidReference => ElectionsServiceError::StillReferenced,
                error => error.into(),
            })?;

        if deleted == 0 {
            return Err(ElectionsServiceError::NotFound);
        }

        info!(election_id = %election, "deleted election");

        Ok(())
    }

    #[tracing::instrument(
        name = "elections.service.update_state",
        skip(self),
        fields(election_id = %election, state = %state),
        err
    )]
    async fn update_state(
        &self,
        election: ElectionId,
        state: ElectionState,
    ) -> Result<(), ElectionsServiceError> {
        if self
            .repository
            .update_election_state(election, state)
            .await?
            == 0
        {
            return Err(ElectionsServiceError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(
        name = "elections.service.reconcile_states",
        skip(self),
        fields(actor = %actor.id, now = %now),
        err
    )]
    async fn reconcile_states(
        &self,
        actor: Actor,
        now: Timestamp,
    ) -> Result<Vec<ElectionRecord>, ElectionsServiceError> {
        ensure_election_manager(actor)?;

        let filter = ElectionFilter::management();
        let elections = self.repository.list_elections(&filter).await?;

        let mut transitioned = 0_usize;

        for election in &elections {
            let resolved = resolve_state(election, now);

            if resolved == election.state {
                continue;
            }

            match self.update_state(election.id, resolved).await {
                Ok(()) => {
                    info!(
                        election_id = %election.id,
                        from = %election.state,
                        to = %resolved,
                        "election state transitioned"
                    );

                    transitioned += 1;
                }
                Err(err) => {
                    error!(
                        election_id = %election.id,
                        to = %resolved,
                        error = %err,
                        "failed to persist election state"
                    );
                }
            }
        }

        if transitioned == 0 {
            return Ok(elections);
        }

        Ok(self.repository.list_elections(&filter).await?)
    }

    #[tracing::instrument(name = "elections.service.has_finalized_elections", skip(self), err)]
    async fn has_finalized_elections(&self) -> Result<bool, ElectionsServiceError> {
        let finalized = self
            .repository
            .list_elections(&ElectionFilter::finalized())
            .await?;

        Ok(!finalized.is_empty())
    }
}

/// Election management and browsing.
#[automock]
#[async_trait]
pub trait ElectionsService: Send + Sync {
    /// Lists elections matching `filter`, in its start-date order.
    async fn list_elections(
        &self,
        filter: ElectionFilter,
    ) -> Result<Vec<ElectionRecord>, ElectionsServiceError>;

    /// Fails with [`ElectionsServiceError::NotFound`] for an unknown id.
    async fn get_election(
        &self,
        election: ElectionId,
    ) -> Result<ElectionRecord, ElectionsServiceError>;

    /// Creates an election. ADMIN or ADMINISTRATIVO only.
    async fn create_election(
        &self,
        actor: Actor,
        fields: ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, ElectionsServiceError>;

    /// Replaces the fields of an election. ADMIN or ADMINISTRATIVO only.
    async fn update_election(
        &self,
        actor: Actor,
        election: ElectionId,
        fields: ElectionFields,
        now: Timestamp,
    ) -> Result<ElectionRecord, ElectionsServiceError>;

    /// Deletes an election. ADMIN or ADMINISTRATIVO only.
    async fn delete_election(
        &self,
        actor: Actor,
        election: ElectionId,
    ) -> Result<(), ElectionsServiceError>;

    /// Persists a lifecycle state without touching any other field.
    async fn update_state(
        &self,
        election: ElectionId,
        state: ElectionState,
    ) -> Result<(), ElectionsServiceError>;

    /// Brings every stored state in line with `now` and returns the management listing.
    ///
    /// Individual write failures are logged and skipped. When at least one
    /// state changed the listing is fetched again rather than patched locally.
    async fn reconcile_states(
        &self,
        actor: Actor,
        now: Timestamp,
    ) -> Result<Vec<ElectionRecord>, ElectionsServiceError>;

    /// Whether any election has finished, which gates the results view.
    async fn has_finalized_elections(&self) -> Result<bool, ElectionsServiceError>;
}
