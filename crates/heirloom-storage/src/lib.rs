//! Storage collaborator for Heirloom.
//!
//! This crate defines the [`VaultStore`] trait — the single-blob storage
//! interface the vault session reads and writes through. The store only ever
//! sees ciphertext: the entire vault is one opaque encrypted envelope, and
//! encryption happens in `heirloom-core` before bytes reach this layer.
//!
//! Two implementations are provided:
//!
//! - [`FileStore`] — the vault as a single file on disk
//! - [`MemoryStore`] — in-memory, for testing
//!
//! There is deliberately no key-value surface here. A vault is one blob;
//! partial reads or writes of it are never meaningful.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// A pluggable single-blob vault store.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
/// The bytes handed to [`write`](VaultStore::write) are always a complete
/// encrypted envelope; the store must persist them atomically enough that a
/// reader never observes a half-written vault.
#[async_trait::async_trait]
pub trait VaultStore: Send + Sync + 'static {
    /// Read the stored vault blob.
    ///
    /// Returns `Ok(None)` if no vault has been written yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the underlying backend fails.
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write the vault blob, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the underlying backend fails.
    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError>;

    /// Remove the stored vault blob. Idempotent — clearing an empty store is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Delete`] if the underlying backend fails.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Check whether a vault blob exists.
    ///
    /// The default implementation calls [`read`](VaultStore::read) and checks
    /// for `Some`. Backends may override this with a cheaper check.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the underlying backend fails.
    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.read().await?.is_some())
    }
}
