//! AES-256-GCM authenticated encryption.
//!
//! The nonce is generated fresh from the OS CSPRNG on every seal and carried
//! separately so the envelope can store it as its own field. Reuse of a
//! `(key, nonce)` pair is a catastrophic confidentiality failure; nothing in
//! this module allows a caller to supply a nonce on the encrypt path.
//!
//! The 16-byte tag covers the entire ciphertext. Any single-bit change to
//! ciphertext or nonce — or a salt change that alters the derived key —
//! makes `open` fail. It never returns corrupted plaintext.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::CryptoError;
use crate::kdf::VaultKey;

/// Nonce length for AES-256-GCM (96 bits).
pub const NONCE_LEN: usize = 12;

/// Authentication tag length (128 bits), appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext with a fresh random nonce.
///
/// Returns `(nonce, ciphertext || tag)`.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] if the AEAD operation fails.
pub(crate) fn seal(key: &VaultKey, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::Encryption {
            reason: e.to_string(),
        })?;
    Ok((nonce.to_vec(), ciphertext))
}

/// Decrypt and authenticate ciphertext produced by [`seal`].
///
/// # Errors
///
/// Returns [`CryptoError::Authentication`] on any failure — wrong key,
/// corrupted ciphertext, or tampered tag. The cause is deliberately not
/// distinguished.
pub(crate) fn open(
    key: &VaultKey,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(CryptoError::Authentication);
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Authentication)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kdf::derive_key;

    fn test_key() -> VaultKey {
        derive_key("cipher-test-passphrase", &[3u8; 16])
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = test_key();
        let (nonce, ciphertext) = seal(&key, b"the vault plaintext").unwrap();
        assert_eq!(nonce.len(), NONCE_LEN);
        let plaintext = open(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(plaintext, b"the vault plaintext");
    }

    #[test]
    fn seal_empty_plaintext() {
        let key = test_key();
        let (nonce, ciphertext) = seal(&key, b"").unwrap();
        // Empty plaintext still carries the full tag.
        assert_eq!(ciphertext.len(), TAG_LEN);
        let plaintext = open(&key, &nonce, &ciphertext).unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn two_seals_produce_different_nonce_and_ciphertext() {
        let key = test_key();
        let (n1, c1) = seal(&key, b"same data").unwrap();
        let (n2, c2) = seal(&key, b"same data").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let key = test_key();
        let other = derive_key("cipher-test-passphrase", &[4u8; 16]);
        let (nonce, ciphertext) = seal(&key, b"secret").unwrap();
        let result = open(&other, &nonce, &ciphertext);
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn every_flipped_ciphertext_byte_fails() {
        let key = test_key();
        let (nonce, ciphertext) = seal(&key, b"tamper target").unwrap();
        for i in 0..ciphertext.len() {
            let mut corrupted = ciphertext.clone();
            corrupted[i] ^= 0x01;
            let result = open(&key, &nonce, &corrupted);
            assert!(result.is_err(), "flipping byte {i} went undetected");
        }
    }

    #[test]
    fn flipped_nonce_byte_fails() {
        let key = test_key();
        let (mut nonce, ciphertext) = seal(&key, b"tamper target").unwrap();
        nonce[0] ^= 0x01;
        assert!(open(&key, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn short_inputs_rejected() {
        let key = test_key();
        assert!(open(&key, &[0u8; 5], &[0u8; 64]).is_err());
        assert!(open(&key, &[0u8; NONCE_LEN], &[0u8; TAG_LEN - 1]).is_err());
    }
}
