//! Request scoping.
//!
//! Each fetch a command makes runs inside a [`ViewScope`], so it stops when
//! the command is interrupted or the configured timeout passes instead of
//! hanging indefinitely.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::ErrorKind;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a scoped request did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The scope was cancelled.
    #[error("request cancelled")]
    Cancelled,

    /// The request ran past the scope's timeout.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
}

impl ScopeError {
    /// Taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Backend
    }
}

/// Cancellation token and timeout shared by the requests of one view.
#[derive(Debug, Clone)]
pub struct ViewScope {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TIMEOUT))
    }
}

impl ViewScope {
    /// `None` disables the timeout.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            token: CancellationToken::new(),
            timeout,
        }
    }

    /// A scope that is cancelled together with this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            timeout: self.timeout,
        }
    }

    /// Per-request time limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Token cancelled with the scope.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancels every request running in this scope and its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drives `fut` unless the scope is cancelled or times out first.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Cancelled`] or [`ScopeError::TimedOut`]; `fut` is
    /// dropped in both cases.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ScopeError>
    where
        F: Future,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| ScopeError::TimedOut(limit)),
                None => Ok(fut.await),
            }
        };

        tokio::select! {
            biased;

            () = self.token.cancelled() => {
                debug!("scope cancelled");

                Err(ScopeError::Cancelled)
            }
            output = bounded => output,
        }
    }
}
