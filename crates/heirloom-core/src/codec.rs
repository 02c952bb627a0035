//! The vault codec: composition of KDF, cipher, envelope, migration, and
//! retention into `open` and `seal`.
//!
//! The codec is a pure transform between bytes and state. It never touches
//! storage, holds no state of its own, and is safe to invoke concurrently
//! for different vaults.
//!
//! # Failure signal
//!
//! Every failure on the open path — malformed envelope, bad base64, failed
//! authentication, undecodable plaintext — collapses into the single
//! [`VaultError::Unreadable`], and the failure paths are kept at roughly the
//! same cost: when the envelope cannot even be decoded, one key derivation
//! against a fixed salt is performed anyway, so an adversary probing a
//! stolen file cannot separate "garbage file" from "wrong passphrase" by
//! message or by timing. Internal causes are logged at `debug!` only.
//! "File is newer than this codec" is the one distinct error; it is not
//! security-sensitive.

use tracing::debug;

use crate::cipher;
use crate::envelope::{self, ENVELOPE_FORMAT_TAG, Envelope};
use crate::error::{EnvelopeError, VaultError};
use crate::kdf::{self, SaltLength};
use crate::migrate::{self, PlaintextError};
use crate::retention;
use crate::schema::{VaultPayload, VaultState};

/// Fixed salt for the burn derivation on undecodable input. Its only job is
/// to make the failure path cost one PBKDF2 run, same as a real attempt.
const BURN_SALT: [u8; 16] = [0x6b; 16];

/// Decrypt and normalize a vault from its transport bytes.
///
/// Pipeline: decode envelope → derive key from the envelope salt → AEAD
/// open → sum-type parse of the plaintext → normalize to the current format.
///
/// # Errors
///
/// - [`VaultError::Unreadable`] — wrong passphrase or invalid file, in all
///   their indistinguishable-by-design forms.
/// - [`VaultError::UnsupportedFormat`] — the file was written by a newer
///   codec.
pub fn open(bytes: &[u8], passphrase: &str) -> Result<VaultPayload, VaultError> {
    let envelope = match envelope::decode(bytes) {
        Ok(envelope) => envelope,
        Err(EnvelopeError::UnsupportedTag { found, supported }) => {
            return Err(VaultError::UnsupportedFormat { found, supported });
        }
        Err(cause) => {
            debug!(%cause, "envelope decode failed");
            // Burn one derivation so this exit costs the same as a wrong
            // passphrase would.
            let _ = kdf::derive_key(passphrase, &BURN_SALT);
            return Err(VaultError::Unreadable);
        }
    };

    let key = kdf::derive_key(passphrase, &envelope.salt);
    let plaintext = cipher::open(&key, &envelope.nonce, &envelope.ciphertext).map_err(|cause| {
        debug!(%cause, "vault authentication failed");
        VaultError::Unreadable
    })?;

    match migrate::parse_plaintext(&plaintext) {
        Ok(payload) => Ok(payload),
        Err(PlaintextError::Unsupported { found, supported }) => {
            Err(VaultError::UnsupportedFormat { found, supported })
        }
        Err(PlaintextError::Malformed(reason)) => {
            debug!(reason, "decrypted plaintext is not a vault payload");
            Err(VaultError::Unreadable)
        }
    }
}

/// Encrypt a vault state for persistence, extending the snapshot ring.
///
/// The next payload is built by the retention engine from `previous` (the
/// payload that was last read or written for this vault) and `new_current`.
/// A fresh random salt is drawn for every seal, so the key is never reused
/// across saves even with the same passphrase. The salt length comes from
/// `salt_length`, falling back to the state's own `salt_length` setting,
/// falling back to 16 bytes.
///
/// Returns the transport bytes together with the payload they contain — the
/// caller keeps the payload as `previous` for the next save.
///
/// # Errors
///
/// Returns [`VaultError::Serialize`] if the in-memory state cannot be
/// serialized, which indicates a programmer error rather than a runtime
/// condition.
pub fn seal(
    previous: Option<&VaultPayload>,
    new_current: VaultState,
    passphrase: &str,
    salt_length: Option<SaltLength>,
) -> Result<(Vec<u8>, VaultPayload), VaultError> {
    let salt_length = salt_length
        .or_else(|| {
            new_current
                .salt_length
                .and_then(|n| SaltLength::from_bytes(usize::try_from(n).ok()?))
        })
        .unwrap_or_default();

    let payload = retention::build_next_payload(previous, new_current);
    let bytes = encrypt_payload(&payload, passphrase, salt_length)?;
    Ok((bytes, payload))
}

/// Encrypt an exact payload without running retention. Used by [`seal`] and
/// by re-encryption paths (import, export) that must preserve the snapshot
/// ring as-is.
pub(crate) fn encrypt_payload(
    payload: &VaultPayload,
    passphrase: &str,
    salt_length: SaltLength,
) -> Result<Vec<u8>, VaultError> {
    let plaintext = migrate::serialize_payload(payload).map_err(|e| VaultError::Serialize {
        reason: e.to_string(),
    })?;

    let salt = kdf::random_salt(salt_length);
    let key = kdf::derive_key(passphrase, &salt);
    let (nonce, ciphertext) = cipher::seal(&key, &plaintext).map_err(|e| VaultError::Serialize {
        reason: e.to_string(),
    })?;

    envelope::encode(&Envelope {
        format_tag: ENVELOPE_FORMAT_TAG,
        salt,
        nonce,
        ciphertext,
    })
    .map_err(|e| VaultError::Serialize {
        reason: e.to_string(),
    })
}
