//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Apply pending migrations before running the command
    #[arg(long, env = "URNA_MIGRATE", default_value_t = false, global = true)]
    pub migrate: bool,
}
