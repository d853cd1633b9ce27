//! Key-value storage for session state.
//!
//! The backing store is picked once at startup from configuration: a JSON file
//! for the native command line, or process memory where nothing should
//! outlive the run.

use std::{
    collections::{BTreeMap, HashMap},
    io::{self, ErrorKind as IoErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed")]
    Io(#[from] io::Error),

    /// The backing file holds something other than a string map.
    #[error("storage file is not a valid JSON object")]
    Format(#[from] serde_json::Error),
}

/// String values addressed by key.
#[automock]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keeps every entry in a single JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by the file at `path`; it is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == IoErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, serde_json::to_vec_pretty(entries)?).await?;

        debug!(path = %self.path.display(), entries = entries.len(), "saved storage file");

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;

        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());

        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await?;

        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }

        Ok(())
    }
}

/// Entries live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn file_store_survives_reopening() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state").join("session.json");

        FileStore::new(&path).set("usuario", "{\"id\":1}").await?;

        let reopened = FileStore::new(&path);

        assert_eq!(
            reopened.get("usuario").await?.as_deref(),
            Some("{\"id\":1}")
        );

        reopened.remove("usuario").await?;

        assert_eq!(reopened.get("usuario").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("absent.json"));

        assert_eq!(store.get("profile").await?, None);

        store.remove("profile").await?;

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_a_format_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");

        tokio::fs::write(&path, b"not json").await?;

        let result = FileStore::new(&path).get("usuario").await;

        assert!(
            matches!(result, Err(StorageError::Format(_))),
            "expected Format error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_overwrites_values() -> TestResult {
        let store = MemoryStore::new();

        store.set("usuario", "a").await?;
        store.set("usuario", "b").await?;

        assert_eq!(store.get("usuario").await?.as_deref(), Some("b"));

        Ok(())
    }
}
