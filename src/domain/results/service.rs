//! Results service.

use std::{fmt, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::domain::{
    elections::{
        data::ElectionFilter,
        records::{ElectionId, ElectionRecord, ElectionState},
        repository::{ElectionsRepository, PgElectionsRepository},
        state::resolve_state,
    },
    results::{
        errors::ResultsServiceError,
        export::{ResultsExporter, export_csv},
        records::CandidateResult,
        tally::tally,
    },
    votes::repository::{PgVotesRepository, VotesRepository},
};

/// Results service over the elections and votes repositories.
#[derive(Clone)]
pub struct ResultsManager {
    elections: Arc<dyn ElectionsRepository>,
    votes: Arc<dyn VotesRepository>,
    exporter: Arc<dyn ResultsExporter>,
}

impl fmt::Debug for ResultsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsManager")
            .finish_non_exhaustive()
    }
}

impl ResultsManager {
    /// Creates a manager that exports through `exporter`.
    #[must_use]
    pub fn new(
        elections: Arc<dyn ElectionsRepository>,
        votes: Arc<dyn VotesRepository>,
        exporter: Arc<dyn ResultsExporter>,
    ) -> Self {
        Self {
            elections,
            votes,
            exporter,
        }
    }

    /// Creates a manager backed by PostgreSQL.
    #[must_use]
    pub fn pg(pool: PgPool, exporter: Arc<dyn ResultsExporter>) -> Self {
        Self::new(
            Arc::new(PgElectionsRepository::new(pool.clone())),
            Arc::new(PgVotesRepository::new(pool)),
            exporter,
        )
    }
}

#[async_trait]
impl ResultsService for ResultsManager {
    #[tracing::instrument(name = "results.service.finalized_elections", skip(self), err)]
    async fn finalized_elections(&self) -> Result<Vec<ElectionRecord>, ResultsServiceError> {
        Ok(self
            .elections
            .list_elections(&ElectionFilter::finalized())
            .await?)
    }

    #[tracing::instrument(
        name = "results.service.tally",
        skip(self),
        fields(election_id = %election),
        err
    )]
    async fn tally(
        &self,
        election: ElectionId,
        now: Timestamp,
    ) -> Result<Vec<CandidateResult>, ResultsServiceError> {
        let record = self.elections.get_election(election).await?;

        if resolve_state(&record, now) != ElectionState::Finalizada {
            return Err(ResultsServiceError::NotFinalized);
        }

        let ballots = self.votes.list_ballots(election).await?;

        Ok(tally(&ballots))
    }

    #[tracing::instrument(
        name = "results.service.export",
        skip(self),
        fields(election_id = %election),
        err
    )]
    async fn export(
        &self,
        election: ElectionId,
        now: Timestamp,
    ) -> Result<PathBuf, ResultsServiceError> {
        let results = self.tally(election, now).await?;
        let path = self.exporter.export(election, &export_csv(&results)).await?;

        info!(candidates = results.len(), "exported election results");

        Ok(path)
    }
}

/// Election results.
///
/// Counts are only revealed once an election has finished at `now`.
#[automock]
#[async_trait]
pub trait ResultsService: Send + Sync {
    /// Finished elections, latest start first.
    async fn finalized_elections(&self) -> Result<Vec<ElectionRecord>, ResultsServiceError>;

    /// Ranked vote counts of `election`, which must resolve to FINALIZADA at `now`.
    async fn tally(
        &self,
        election: ElectionId,
        now: Timestamp,
    ) -> Result<Vec<CandidateResult>, ResultsServiceError>;

    /// Tallies `election` and hands the CSV to the configured exporter.
    async fn export(
        &self,
        election: ElectionId,
        now: Timestamp,
    ) -> Result<PathBuf, ResultsServiceError>;
}
