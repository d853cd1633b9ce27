//! Results export.

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::domain::{elections::records::ElectionId, results::records::CandidateResult};

/// Header line of every export.
pub const CSV_HEADER: &str = "Candidato,Votos";

/// Formats results as CSV.
///
/// Names are always quoted with embedded quotes doubled. Rows are joined with
/// `\n` and there is no trailing newline.
pub fn export_csv(results: &[CandidateResult]) -> String {
    let mut csv = String::from(CSV_HEADER);

    for result in results {
        csv.push('\n');
        csv.push('"');
        csv.push_str(&result.name.replace('"', "\"\""));
        csv.push_str("\",");
        csv.push_str(&result.votes.to_string());
    }

    csv
}

/// File name an election's results are exported under.
pub fn export_file_name(election: ElectionId) -> String {
    format!("resultados_eleccion_{election}.csv")
}

/// Somewhere exported results can be saved.
#[automock]
#[async_trait]
pub trait ResultsExporter: Send + Sync {
    /// Saves `csv` for `election` and returns where it went.
    async fn export(&self, election: ElectionId, csv: &str) -> io::Result<PathBuf>;
}

/// Writes exports as UTF-8 files into a directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    /// Exporter writing into `dir`, created on first export.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ResultsExporter for FileExporter {
    async fn export(&self, election: ElectionId, csv: &str) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(export_file_name(election));

        tokio::fs::write(&path, csv.as_bytes()).await?;

        info!(path = %path.display(), "exported results");

        Ok(path)
    }
}
