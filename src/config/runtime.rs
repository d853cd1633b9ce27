//! Runtime Config

use std::{path::PathBuf, time::Duration};

use clap::Args;

/// Where session state is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// A JSON file that survives between runs.
    File,

    /// Process memory; nothing is remembered after exit.
    Memory,
}

/// Session storage, export and request settings.
#[derive(Debug, Args)]
pub struct RuntimeConfig {
    /// Session storage backend (file, memory)
    #[arg(
        long,
        env = "URNA_STORAGE",
        value_enum,
        default_value_t = StorageBackend::File,
        global = true
    )]
    pub storage: StorageBackend,

    /// Session file used by the file storage backend
    #[arg(
        long,
        env = "URNA_SESSION_FILE",
        default_value = ".urna/session.json",
        global = true
    )]
    pub session_file: PathBuf,

    /// Directory results are exported into
    #[arg(long, env = "URNA_EXPORT_DIR", default_value = ".", global = true)]
    pub export_dir: PathBuf,

    /// Seconds before a backend request is abandoned; 0 disables the limit
    #[arg(
        long,
        env = "URNA_REQUEST_TIMEOUT_SECONDS",
        default_value_t = 30_u64,
        global = true
    )]
    pub request_timeout_seconds: u64,
}

impl RuntimeConfig {
    /// Request time limit, `None` when disabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.request_timeout_seconds))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        runtime: RuntimeConfig,
    }

    #[test]
    fn zero_timeout_disables_the_limit() -> Result<(), clap::Error> {
        let harness = Harness::try_parse_from(["urna", "--request-timeout-seconds", "0"])?;

        assert_eq!(harness.runtime.request_timeout(), None);

        Ok(())
    }

    #[test]
    fn storage_backend_parses_from_flag() -> Result<(), clap::Error> {
        let harness = Harness::try_parse_from(["urna", "--storage", "memory"])?;

        assert_eq!(harness.runtime.storage, StorageBackend::Memory);
        assert_eq!(
            harness.runtime.request_timeout(),
            Some(Duration::from_secs(30))
        );

        Ok(())
    }
}
