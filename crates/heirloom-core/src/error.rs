//! Error types for `heirloom-core`.
//!
//! The taxonomy follows a deliberate split between internal and external
//! errors. Internally, format violations and authentication failures are
//! distinct so they can be logged at `debug!` level. At the public `open`
//! boundary both collapse into a single [`VaultError::Unreadable`] so a
//! caller (or an adversary observing outcomes) cannot tell "wrong
//! passphrase" from "corrupted file". Only "this file is newer than the
//! codec" is reported distinctly — it is not security-sensitive.
//!
//! Errors never contain key material, passphrases, or plaintext.

use heirloom_storage::StoreError;

/// Internal: why an envelope or plaintext failed to decode.
///
/// Never surfaced directly — callers of `open` only ever see
/// [`VaultError::Unreadable`] or [`VaultError::UnsupportedFormat`].
#[derive(Debug, thiserror::Error)]
pub(crate) enum EnvelopeError {
    /// The input exceeds the size guard ceiling.
    #[error("input of {actual} bytes exceeds the {limit} byte ceiling")]
    TooLarge { actual: usize, limit: usize },

    /// The envelope JSON is not the expected shape, a field failed to decode
    /// as base64, or a binary field has an invalid length.
    #[error("malformed envelope: {reason}")]
    Malformed { reason: String },

    /// The envelope carries a format tag newer than this codec understands.
    #[error("envelope format {found} is newer than supported {supported}")]
    UnsupportedTag { found: u32, supported: u32 },
}

/// Internal: cryptographic failures.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CryptoError {
    /// AES-256-GCM encryption failed.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },

    /// AES-256-GCM authentication failed — wrong key, corrupted ciphertext,
    /// or tampered tag. Which one is deliberately unknowable.
    #[error("authentication failed")]
    Authentication,
}

/// Public errors from the vault codec.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Wrong passphrase or invalid vault file.
    ///
    /// This single variant covers malformed envelopes, bad base64, failed
    /// AEAD authentication, undecodable plaintext, and unrecognized payload
    /// shapes. The merge is intentional: distinguishing them would hand an
    /// attacker probing a stolen file a structural oracle.
    #[error("wrong passphrase or invalid vault file")]
    Unreadable,

    /// The file was written by a newer version of the format.
    ///
    /// Not security-sensitive — it only means "upgrade the app".
    #[error("vault format {found} is newer than this version supports ({supported})")]
    UnsupportedFormat { found: u32, supported: u32 },

    /// Serializing in-memory state failed. This indicates a programmer
    /// error (invalid in-memory state), not a runtime condition.
    #[error("failed to serialize vault state: {reason}")]
    Serialize { reason: String },
}

/// Errors from vault session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A vault already exists in the store.
    #[error("a vault already exists")]
    AlreadyExists,

    /// No vault exists in the store yet.
    #[error("no vault found")]
    NotFound,

    /// The session is locked — unlock before reading or saving.
    #[error("vault is locked")]
    Locked,

    /// The codec rejected the file or the passphrase.
    #[error(transparent)]
    Codec(#[from] VaultError),

    /// The storage collaborator failed.
    #[error("vault storage error: {0}")]
    Store(#[from] StoreError),
}
