//! Tracing subscriber initialisation.

use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Logs go to stderr so command output stays clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    match config.log_format {
        LogFormat::Compact => init_subscriber(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => init_subscriber(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        ),
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(format!("{},sqlx=warn", config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_subscriber<L>(config: &LoggingConfig, fmt_layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config))
        .try_init()
}
