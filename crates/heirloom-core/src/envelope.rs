//! Transport envelope for the encrypted vault.
//!
//! Binds salt, nonce, ciphertext, and a format tag into the JSON object that
//! is written to disk:
//!
//! ```json
//! { "version": 1, "salt": "<base64>", "iv": "<base64>", "ciphertext": "<base64>" }
//! ```
//!
//! Field names (`iv` in particular) are fixed by files already in the wild.
//!
//! Decoding validates strictly — object shape, all four fields, clean
//! base64, permitted salt and nonce lengths — but every violation collapses
//! into one internal [`EnvelopeError::Malformed`]. A size guard rejects
//! oversized input before any parse attempt, bounding memory use against
//! hostile files.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::cipher::NONCE_LEN;
use crate::error::EnvelopeError;
use crate::kdf::SaltLength;

/// Envelope format tag written by this codec.
pub const ENVELOPE_FORMAT_TAG: u32 = 1;

/// Size guard ceiling for envelope input: 50 MB.
pub const MAX_VAULT_FILE_BYTES: usize = 50 * 1024 * 1024;

/// A decoded encrypted envelope.
///
/// Immutable once produced: created by seal, consumed exactly once by open,
/// never partially decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Envelope format tag (currently always [`ENVELOPE_FORMAT_TAG`]).
    pub format_tag: u32,
    /// KDF salt, 16 or 32 bytes.
    pub salt: Vec<u8>,
    /// AEAD nonce, 12 bytes.
    pub nonce: Vec<u8>,
    /// Ciphertext with the 16-byte tag appended.
    pub ciphertext: Vec<u8>,
}

/// Wire form of the envelope. Kept private — callers see bytes in, bytes out.
#[derive(Serialize, Deserialize)]
struct StoredEnvelope {
    version: u32,
    salt: String,
    iv: String,
    ciphertext: String,
}

/// Serialize an envelope to transport bytes (pretty-printed JSON, matching
/// files written by earlier versions of the format).
///
/// # Errors
///
/// Returns [`EnvelopeError::Malformed`] only if JSON serialization itself
/// fails, which cannot happen for this struct in practice.
pub(crate) fn encode(envelope: &Envelope) -> Result<Vec<u8>, EnvelopeError> {
    let stored = StoredEnvelope {
        version: envelope.format_tag,
        salt: BASE64.encode(&envelope.salt),
        iv: BASE64.encode(&envelope.nonce),
        ciphertext: BASE64.encode(&envelope.ciphertext),
    };
    serde_json::to_vec_pretty(&stored).map_err(|e| EnvelopeError::Malformed {
        reason: format!("envelope serialization failed: {e}"),
    })
}

/// Parse transport bytes back into an [`Envelope`].
///
/// # Errors
///
/// - [`EnvelopeError::TooLarge`] if the input exceeds [`MAX_VAULT_FILE_BYTES`].
///   Checked before any parsing.
/// - [`EnvelopeError::UnsupportedTag`] if the format tag is newer than this
///   codec writes.
/// - [`EnvelopeError::Malformed`] for everything else: wrong JSON shape,
///   missing fields, bad base64, wrong salt or nonce length.
pub(crate) fn decode(bytes: &[u8]) -> Result<Envelope, EnvelopeError> {
    if bytes.len() > MAX_VAULT_FILE_BYTES {
        return Err(EnvelopeError::TooLarge {
            actual: bytes.len(),
            limit: MAX_VAULT_FILE_BYTES,
        });
    }

    let stored: StoredEnvelope =
        serde_json::from_slice(bytes).map_err(|e| EnvelopeError::Malformed {
            reason: format!("not a valid envelope object: {e}"),
        })?;

    if stored.version > ENVELOPE_FORMAT_TAG {
        return Err(EnvelopeError::UnsupportedTag {
            found: stored.version,
            supported: ENVELOPE_FORMAT_TAG,
        });
    }
    if stored.version != ENVELOPE_FORMAT_TAG {
        return Err(EnvelopeError::Malformed {
            reason: format!("unrecorded format tag {}", stored.version),
        });
    }

    let salt = decode_b64(&stored.salt, "salt")?;
    let nonce = decode_b64(&stored.iv, "iv")?;
    let ciphertext = decode_b64(&stored.ciphertext, "ciphertext")?;

    if SaltLength::from_bytes(salt.len()).is_none() {
        return Err(EnvelopeError::Malformed {
            reason: format!("salt length {} is not permitted", salt.len()),
        });
    }
    if nonce.len() != NONCE_LEN {
        return Err(EnvelopeError::Malformed {
            reason: format!("nonce length {} is not permitted", nonce.len()),
        });
    }

    Ok(Envelope {
        format_tag: stored.version,
        salt,
        nonce,
        ciphertext,
    })
}

fn decode_b64(field: &str, name: &str) -> Result<Vec<u8>, EnvelopeError> {
    BASE64.decode(field).map_err(|e| EnvelopeError::Malformed {
        reason: format!("field '{name}' is not valid base64: {e}"),
    })
}
