//! Passphrase key derivation for Heirloom.
//!
//! Stretches a passphrase into a 256-bit AES key with PBKDF2-HMAC-SHA-256 at
//! a deliberately high, fixed work factor so brute force against a stolen
//! envelope is expensive. The salt is stored alongside the ciphertext so
//! derivation is repeatable; a fresh salt per save keeps keys unrelated
//! across vaults and across saves of the same vault.
//!
//! # Security model
//!
//! - 600 000 iterations, fixed. The count bounds worst-case `open` latency
//!   to roughly one second on commodity hardware.
//! - Salts are 16 or 32 bytes ([`SaltLength`]); nothing shorter is ever
//!   accepted at the envelope boundary.
//! - The derived key is a zeroize-on-drop newtype and never appears in
//!   `Debug` output.

use std::fmt;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count. Fixed — changing it would orphan existing vaults,
/// since the count is not recorded in the envelope.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Permitted salt lengths for key derivation.
///
/// Caller-selectable per save as a security/size tradeoff. This enum is the
/// whole validation story: a salt length outside these two values cannot be
/// expressed, so derivation never sees a degenerate salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaltLength {
    /// 16 bytes — the default.
    #[default]
    Sixteen,
    /// 32 bytes.
    ThirtyTwo,
}

impl SaltLength {
    /// Length in bytes.
    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            Self::Sixteen => 16,
            Self::ThirtyTwo => 32,
        }
    }

    /// Map a byte count to a salt length, if it is one of the permitted two.
    #[must_use]
    pub fn from_bytes(len: usize) -> Option<Self> {
        match len {
            16 => Some(Self::Sixteen),
            32 => Some(Self::ThirtyTwo),
            _ => None,
        }
    }
}

/// A 256-bit vault key derived from a passphrase, zeroized on drop.
///
/// Lives only for the duration of a single seal or open; no component holds
/// one across calls.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_LEN]);

impl VaultKey {
    /// Borrow the raw key bytes.
    ///
    /// Use with care — the caller must not log or persist these bytes.
    #[must_use]
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a vault key from a passphrase and salt.
///
/// Deterministic: the same `(passphrase, salt)` pair always yields the same
/// key. Cannot fail — malformed salt lengths are rejected at the envelope
/// boundary before derivation is ever reached.
#[must_use]
pub fn derive_key(passphrase: &str, salt: &[u8]) -> VaultKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    VaultKey(key)
}

/// Generate a fresh random salt of the given length from the OS CSPRNG.
#[must_use]
pub fn random_salt(length: SaltLength) -> Vec<u8> {
    let mut salt = vec![0u8; length.bytes()];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Derivation tests run with a reduced input space but the real iteration
    // count — each call costs real CPU, so they are kept few and meaningful.

    #[test]
    fn derive_is_deterministic() {
        let salt = [7u8; 16];
        let k1 = derive_key("correct horse", &salt);
        let k2 = derive_key("correct horse", &salt);
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_salts_give_unrelated_keys() {
        let k1 = derive_key("same passphrase", &[1u8; 16]);
        let k2 = derive_key("same passphrase", &[2u8; 16]);
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_passphrases_give_different_keys() {
        let salt = [9u8; 16];
        let k1 = derive_key("alpha", &salt);
        let k2 = derive_key("beta", &salt);
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn random_salt_has_requested_length() {
        assert_eq!(random_salt(SaltLength::Sixteen).len(), 16);
        assert_eq!(random_salt(SaltLength::ThirtyTwo).len(), 32);
    }

    #[test]
    fn random_salts_differ() {
        assert_ne!(
            random_salt(SaltLength::Sixteen),
            random_salt(SaltLength::Sixteen)
        );
    }

    #[test]
    fn salt_length_round_trips_through_bytes() {
        assert_eq!(SaltLength::from_bytes(16), Some(SaltLength::Sixteen));
        assert_eq!(SaltLength::from_bytes(32), Some(SaltLength::ThirtyTwo));
        assert_eq!(SaltLength::from_bytes(0), None);
        assert_eq!(SaltLength::from_bytes(24), None);
    }

    #[test]
    fn vault_key_debug_redacts_bytes() {
        let key = derive_key("p", &[0u8; 16]);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
    }
}
