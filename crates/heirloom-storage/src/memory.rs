//! In-memory vault store for testing.
//!
//! Holds the blob in an `RwLock<Option<Vec<u8>>>`. Not persistent — all data
//! is lost when the process exits. Use this for unit and integration tests
//! that need a real store without touching disk.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{StoreError, VaultStore};

/// An in-memory vault store.
///
/// Thread-safe and async-compatible. Cloning shares the underlying blob.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    blob: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blob: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl VaultStore for MemoryStore {
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let blob = self.blob.read().await;
        Ok(blob.clone())
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut blob = self.blob.write().await;
        *blob = Some(bytes.to_vec());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut blob = self.blob.write().await;
        *blob = None;
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        let blob = self.blob.read().await;
        Ok(blob.is_some())
    }
}
