//! File-backed vault store.
//!
//! The vault lives as a single file on disk. Writes go to a sibling
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous vault intact rather than a truncated one.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{StoreError, VaultStore};

/// Vault store backed by a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the given vault file path.
    ///
    /// The file is not created until the first [`write`](VaultStore::write).
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait::async_trait]
impl VaultStore for FileStore {
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                location: self.location(),
                reason: e.to_string(),
            }),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = self.temp_path();
        let write_err = |e: std::io::Error| StoreError::Write {
            location: self.location(),
            reason: e.to_string(),
        };

        let mut file = tokio::fs::File::create(&tmp).await.map_err(write_err)?;
        file.write_all(bytes).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(write_err)?;

        debug!(path = %self.path.display(), len = bytes.len(), "vault file written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Delete {
                location: self.location(),
                reason: e.to_string(),
            }),
        }
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(&self.path).await.unwrap_or(false))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("vault.heirloom"))
    }

    #[tokio::test]
    async fn read_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(b"{\"version\":1}").await.unwrap();
        let blob = store.read().await.unwrap();
        assert_eq!(blob, Some(b"{\"version\":1}".to_vec()));
    }

    #[tokio::test]
    async fn write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(b"old").await.unwrap();
        store.write(b"new").await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(b"data").await.unwrap();
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(b"data").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn exists_reflects_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.exists().await.unwrap());
        store.write(b"data").await.unwrap();
        assert!(store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn read_reports_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        // The path is a directory, not a file — read must fail, not hang.
        let store = FileStore::new(dir.path());
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
