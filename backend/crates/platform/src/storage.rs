//! Local JSON Storage
//!
//! Persists a single serde value in a file. Writes go to a sibling temp file
//! and are renamed into place so a crash never leaves a half-written document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A JSON document stored at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document; `None` when the file does not exist
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the document
    pub async fn store<T: Serialize>(&self, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Remove the document; missing file is not an error
    pub async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("platform-storage-{}-{}", std::process::id(), nanos))
            .join(name)
    }

    #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
    struct Slot {
        token: String,
        expires_at_ms: i64,
    }

    #[test]
    fn test_store_load_clear() {
        tokio_test::block_on(async {
            let file = JsonFile::new(scratch_path("session.json"));
            assert!(file.load::<Slot>().await.unwrap().is_none());

            let slot = Slot {
                token: "abc".to_string(),
                expires_at_ms: 42,
            };
            file.store(&slot).await.unwrap();
            assert_eq!(file.load::<Slot>().await.unwrap(), Some(slot));

            file.clear().await.unwrap();
            assert!(file.load::<Slot>().await.unwrap().is_none());

            // Clearing twice is fine
            file.clear().await.unwrap();
        });
    }

    #[test]
    fn test_corrupt_document() {
        tokio_test::block_on(async {
            let path = scratch_path("corrupt.json");
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(&path, b"{ nope").await.unwrap();

            let file = JsonFile::new(path);
            assert!(matches!(
                file.load::<Slot>().await,
                Err(StorageError::Json(_))
            ));
        });
    }
}
