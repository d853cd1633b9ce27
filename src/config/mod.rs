//! Application configuration

use clap::Args;

pub use crate::config::{
    db::DatabaseConfig,
    observability::{LogFormat, LoggingConfig},
    runtime::{RuntimeConfig, StorageBackend},
};

pub mod db;
pub mod observability;
pub mod runtime;

/// Settings shared by every command, from flags or the environment.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Session storage, export and request settings.
    #[command(flatten)]
    pub runtime: RuntimeConfig,
}
