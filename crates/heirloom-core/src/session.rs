//! Vault session: single-writer orchestration over a storage collaborator.
//!
//! A [`VaultSession`] owns a [`VaultStore`] and the one in-memory payload
//! for an unlocked vault. The codec itself is stateless; the session is
//! where the "previous payload" for the snapshot ring lives between saves,
//! and its internal `Mutex` guarantees at most one seal is in flight per
//! vault — two overlapping saves racing on the previous payload would
//! silently drop a snapshot from history.
//!
//! The session receives the passphrase per call and never retains it.
//! Where the passphrase came from (keyboard, a recovery layer) is the
//! caller's business.

use std::fmt;
use std::sync::Arc;

use heirloom_storage::VaultStore;
use tokio::sync::Mutex;
use tracing::info;

use crate::codec;
use crate::error::SessionError;
use crate::kdf::SaltLength;
use crate::schema::{
    HistoryAction, VaultPayload, VaultState, append_history, initial_payload,
};

/// Current session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    /// Whether a vault blob exists in the store.
    pub exists: bool,
    /// Whether the session currently holds an unlocked payload.
    pub unlocked: bool,
}

/// An open handle to one vault in one store.
///
/// Cheap to create; holds no key material. Unlocking caches the decrypted
/// payload until [`lock`](VaultSession::lock) clears it.
pub struct VaultSession {
    store: Arc<dyn VaultStore>,
    /// The unlocked payload, if any. Locked across seal+write so saves are
    /// serialized per vault.
    payload: Mutex<Option<VaultPayload>>,
}

impl VaultSession {
    /// Create a session over the given store. The vault stays locked until
    /// [`create`](Self::create) or [`unlock`](Self::unlock).
    #[must_use]
    pub fn new(store: Arc<dyn VaultStore>) -> Self {
        Self {
            store,
            payload: Mutex::new(None),
        }
    }

    /// Whether a vault exists in the store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the storage collaborator fails.
    pub async fn exists(&self) -> Result<bool, SessionError> {
        Ok(self.store.exists().await?)
    }

    /// Current status of this session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the storage collaborator fails.
    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        Ok(SessionStatus {
            exists: self.store.exists().await?,
            unlocked: self.payload.lock().await.is_some(),
        })
    }

    /// Create a new empty vault, seal it with the passphrase, and persist it.
    ///
    /// The new vault's history opens with a `store_created` entry. The
    /// session is left unlocked on the new payload.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyExists`] if the store already holds a vault.
    /// - [`SessionError::Codec`] / [`SessionError::Store`] on seal or write
    ///   failure.
    pub async fn create(
        &self,
        passphrase: &str,
        salt_length: Option<SaltLength>,
    ) -> Result<VaultPayload, SessionError> {
        let mut guard = self.payload.lock().await;
        if self.store.exists().await? {
            return Err(SessionError::AlreadyExists);
        }

        let initial = initial_payload();
        let (bytes, payload) =
            codec::seal(None, initial.current, passphrase, salt_length)?;
        self.store.write(&bytes).await?;
        *guard = Some(payload.clone());

        info!("vault created");
        Ok(payload)
    }

    /// Unlock the vault: read, decrypt, normalize, and cache the payload.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] if no vault exists yet.
    /// - [`SessionError::Codec`] for a wrong passphrase or invalid file.
    pub async fn unlock(&self, passphrase: &str) -> Result<VaultPayload, SessionError> {
        let mut guard = self.payload.lock().await;
        let bytes = self.store.read().await?.ok_or(SessionError::NotFound)?;
        let payload = codec::open(&bytes, passphrase)?;
        *guard = Some(payload.clone());

        info!(
            entries = payload.current.entries.len(),
            snapshots = payload.versions.len(),
            "vault unlocked"
        );
        Ok(payload)
    }

    /// Save a new current state: extend the snapshot ring from the cached
    /// payload, seal with a fresh key, and persist.
    ///
    /// The lock is held across seal and write, so concurrent saves on the
    /// same session serialize rather than race.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Locked`] if the vault has not been unlocked.
    /// - [`SessionError::Codec`] / [`SessionError::Store`] on seal or write
    ///   failure.
    pub async fn save(
        &self,
        passphrase: &str,
        new_current: VaultState,
    ) -> Result<VaultPayload, SessionError> {
        let mut guard = self.payload.lock().await;
        let previous = guard.as_ref().ok_or(SessionError::Locked)?;

        let (bytes, payload) = codec::seal(Some(previous), new_current, passphrase, None)?;
        self.store.write(&bytes).await?;
        *guard = Some(payload.clone());

        info!(snapshots = payload.versions.len(), "vault saved");
        Ok(payload)
    }

    /// Import a vault from foreign transport bytes (an exported file).
    ///
    /// Decrypts with the supplied passphrase, appends a `vault_imported`
    /// history entry, re-encrypts for this store preserving the imported
    /// snapshot ring, persists, and leaves the session unlocked on it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Codec`] if the bytes or passphrase are not valid.
    /// - [`SessionError::Store`] if persisting fails.
    pub async fn import(
        &self,
        passphrase: &str,
        bytes: &[u8],
    ) -> Result<VaultPayload, SessionError> {
        let mut guard = self.payload.lock().await;
        let mut payload = codec::open(bytes, passphrase)?;
        payload.current.history = append_history(
            &payload.current.history,
            HistoryAction::VaultImported,
            None,
            None,
            None,
        );

        let sealed = codec::encrypt_payload(&payload, passphrase, SaltLength::default())?;
        self.store.write(&sealed).await?;
        *guard = Some(payload.clone());

        info!(entries = payload.current.entries.len(), "vault imported");
        Ok(payload)
    }

    /// Export the unlocked vault as a freshly sealed encrypted blob,
    /// preserving the snapshot ring.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Locked`] if the vault has not been unlocked.
    /// - [`SessionError::Codec`] on seal failure.
    pub async fn export(&self, passphrase: &str) -> Result<Vec<u8>, SessionError> {
        let guard = self.payload.lock().await;
        let payload = guard.as_ref().ok_or(SessionError::Locked)?;
        let bytes = codec::encrypt_payload(payload, passphrase, SaltLength::default())?;
        Ok(bytes)
    }

    /// Lock the session, dropping the cached payload.
    pub async fn lock(&self) {
        let mut guard = self.payload.lock().await;
        *guard = None;
        info!("vault locked");
    }
}

impl fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSession")
            .field("unlocked", &"<check with status()>")
            .finish_non_exhaustive()
    }
}
