//! Row change notifications.
//!
//! Every write to `elections`, `candidacies` or `votes` fires
//! `pg_notify('<table>_changes', TG_OP)` from a trigger. Subscribers get a
//! callback per notification until their [`Subscription`] is cancelled or
//! dropped.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
    sync::Arc,
};

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgListener};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::errors::UnknownVariant;

/// Tables that publish change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `elections`
    Elections,
    /// `candidacies`
    Candidacies,
    /// `votes`
    Votes,
}

impl Table {
    /// Table name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elections => "elections",
            Self::Candidacies => "candidacies",
            Self::Votes => "votes",
        }
    }

    /// Notification channel the table's trigger publishes on.
    pub fn channel(self) -> String {
        format!("{}_changes", self.as_str())
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Kind of row change, as reported by `TG_OP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOperation {
    /// Row inserted.
    Insert,
    /// Row updated.
    Update,
    /// Row deleted.
    Delete,
}

impl FromStr for ChangeOperation {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Ok(Self::Insert),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnknownVariant::new("operation", s)),
        }
    }
}

/// One notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Table that changed.
    pub table: Table,
    /// What happened to the row.
    pub operation: ChangeOperation,
}

/// Invoked once per change.
pub type ChangeCallback = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Subscription failures.
#[derive(Debug, Error)]
pub enum ChangeFeedError {
    /// The listener could not connect or `LISTEN`.
    #[error("failed to listen for changes")]
    Listen(#[from] sqlx::Error),
}

/// Handle to a running subscription; stops it when cancelled or dropped.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Runs `task` until `token` is cancelled.
    pub fn spawn<F>(token: CancellationToken, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = token.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                () = guard.cancelled() => {}
                () = task => {}
            }
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// Whether the subscription has been stopped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stops delivering notifications.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits until the subscription has stopped.
    pub async fn closed(mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        if let Err(err) = task.await {
            warn!(error = %err, "change subscription task failed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Source of change notifications.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Calls `callback` for every change to `table` until the returned
    /// subscription is cancelled or dropped.
    async fn subscribe(
        &self,
        table: Table,
        callback: ChangeCallback,
    ) -> Result<Subscription, ChangeFeedError>;
}

/// `LISTEN`-based change feed.
#[derive(Debug, Clone)]
pub struct PgChangeFeed {
    pool: PgPool,
}

impl PgChangeFeed {
    /// Feed listening on connections from `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    #[tracing::instrument(name = "changes.subscribe", skip(self, callback), fields(table = %table), err)]
    async fn subscribe(
        &self,
        table: Table,
        callback: ChangeCallback,
    ) -> Result<Subscription, ChangeFeedError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;

        listener.listen(&table.channel()).await?;

        debug!(channel = %table.channel(), "listening for changes");

        Ok(Subscription::spawn(CancellationToken::new(), async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(notification) => notification,
                    Err(err) => {
                        error!(%table, error = %err, "change listener failed");

                        return;
                    }
                };

                match notification.payload().parse() {
                    Ok(operation) => callback(ChangeEvent { table, operation }),
                    Err(err) => warn!(%table, error = %err, "ignoring change notification"),
                }
            }
        }))
    }
}
