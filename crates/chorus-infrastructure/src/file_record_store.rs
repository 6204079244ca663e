//! File-backed record store.
//!
//! Each record key maps to `<data_dir>/<key>.json`, written through
//! [`AtomicFile`] on a blocking thread.

use crate::paths::{ChorusPaths, ServiceType};
use crate::storage::AtomicFile;
use async_trait::async_trait;
use chorus_core::error::{ChorusError, Result};
use chorus_core::record::RecordStore;
use std::path::{Path, PathBuf};

/// Stores records as individual JSON files in one directory.
///
/// # Example
///
/// ```ignore
/// use chorus_infrastructure::{ChorusPaths, FileRecordStore};
///
/// let store = FileRecordStore::from_paths(&ChorusPaths::new(None)?);
/// store.save("settings", "{}").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn from_paths(paths: &ChorusPaths) -> Self {
        Self::new(paths.get_path(ServiceType::Records))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ChorusError::internal(format!("invalid record key '{}'", key)));
        }
        Ok(AtomicFile::new(self.dir.join(format!("{}.json", key))))
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ChorusError::internal(format!("record store task failed: {}", e)))?
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let file = self.file_for(key)?;
        run_blocking(move || file.read()).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key)?;
        let value = value.to_string();
        tracing::debug!("[FileRecordStore] Writing record '{}' ({} bytes)", key, value.len());
        run_blocking(move || file.write(&value)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key)?;
        run_blocking(move || file.remove()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_load_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp_dir.path().join("data"));

        assert!(store.load("sessions").await.unwrap().is_none());

        store.save("sessions", "[]").await.unwrap();
        assert_eq!(store.load("sessions").await.unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("data").join("sessions.json").exists());

        store.save("sessions", "[1]").await.unwrap();
        assert_eq!(store.load("sessions").await.unwrap().as_deref(), Some("[1]"));

        store.remove("sessions").await.unwrap();
        assert!(store.load("sessions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp_dir.path().to_path_buf());

        assert!(store.save("../escape", "x").await.is_err());
        assert!(store.load("").await.is_err());
    }

    #[tokio::test]
    async fn test_from_paths_uses_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorusPaths::new(Some(temp_dir.path())).unwrap();
        let store = FileRecordStore::from_paths(&paths);
        assert_eq!(store.dir(), temp_dir.path().join("data").as_path());
    }
}
