//! Payload schema migration engine.
//!
//! A state machine over `VaultState::format_version`: each released version
//! has a pure upgrade function to the next, applied in order by
//! [`normalize`] until the state reaches [`CURRENT_FORMAT_VERSION`].
//! Migrations are additive only — they introduce fields with safe defaults
//! and never remove or reinterpret existing data — and once shipped they are
//! immutable. New migrations append to the end of the chain.
//!
//! This module also owns the plaintext wire shape. Decrypted plaintext is
//! either the format-2 payload (`{"format":2,"current":...}`) or a bare
//! legacy state from before the file format existed. The two are told apart
//! by a sum-type parse — strict match for the payload shape first, then for
//! the bare state — rather than by probing individual fields. Anything
//! matching neither is rejected.

use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::schema::{
    CURRENT_FORMAT_VERSION, DEFAULT_VERSION_HISTORY_LIMIT, MAX_VERSION_HISTORY_LIMIT, VaultPayload,
    VaultState,
};

/// Plaintext payload format tag, embedded as the `format` field to
/// distinguish the wrapped payload from a legacy bare state.
pub const PAYLOAD_FORMAT: u32 = 2;

/// Internal: why plaintext failed to parse into a payload.
#[derive(Debug)]
pub(crate) enum PlaintextError {
    /// Not the payload shape and not the legacy shape.
    Malformed(String),
    /// A format or state version newer than this codec understands.
    Unsupported { found: u32, supported: u32 },
}

/// Wire shape of the format-2 payload.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPayload {
    format: u32,
    current: VaultState,
    #[serde(default)]
    versions: Vec<VaultState>,
    #[serde(default)]
    version_history_limit: Option<u32>,
}

/// The two plaintext shapes this codec has ever written. Variant order
/// matters: the payload shape is tried first, the bare legacy state second.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlaintextDocument {
    Payload(StoredPayload),
    Legacy(VaultState),
}

// ── migration chain ──────────────────────────────────────────────────
//
// Field backfill for absent wire fields happens at deserialization via
// serde defaults (empty lists, empty strings); each step here records the
// version bump that makes those defaults authoritative. Released steps are
// frozen — append new ones, never edit these.

/// v1 → v2: categories arrive; entries gain an optional category id.
fn migrate_v1_to_v2(mut state: VaultState) -> VaultState {
    state.format_version = 2;
    state
}

/// v2 → v3: successor guide, change history, uploaded keys.
fn migrate_v2_to_v3(mut state: VaultState) -> VaultState {
    state.format_version = 3;
    state
}

/// v3 → v4: user nickname.
fn migrate_v3_to_v4(mut state: VaultState) -> VaultState {
    state.format_version = 4;
    state
}

/// Upgrade a state to [`CURRENT_FORMAT_VERSION`] by applying each pending
/// migration in order.
///
/// Idempotent, and purely additive: no field present in the input is
/// dropped. Also fills in the snapshot limit default for states that
/// predate it.
///
/// # Errors
///
/// Returns [`VaultError::UnsupportedFormat`] if the state claims a version
/// newer than this codec understands.
pub fn normalize(mut state: VaultState) -> Result<VaultState, VaultError> {
    if state.format_version > CURRENT_FORMAT_VERSION {
        return Err(VaultError::UnsupportedFormat {
            found: state.format_version,
            supported: CURRENT_FORMAT_VERSION,
        });
    }
    if state.format_version < 2 {
        state = migrate_v1_to_v2(state);
    }
    if state.format_version < 3 {
        state = migrate_v2_to_v3(state);
    }
    if state.format_version < 4 {
        state = migrate_v3_to_v4(state);
    }
    if state.version_history_limit.is_none() {
        state.version_history_limit = Some(DEFAULT_VERSION_HISTORY_LIMIT);
    }
    Ok(state)
}

/// Parse decrypted plaintext into a normalized [`VaultPayload`].
///
/// Accepts the format-2 payload shape or a legacy bare state; the latter is
/// wrapped as a payload with an empty snapshot ring. Current state and every
/// retained snapshot are normalized to the current format.
pub(crate) fn parse_plaintext(bytes: &[u8]) -> Result<VaultPayload, PlaintextError> {
    let document: PlaintextDocument =
        serde_json::from_slice(bytes).map_err(|e| PlaintextError::Malformed(e.to_string()))?;

    match document {
        PlaintextDocument::Payload(stored) => {
            if stored.format > PAYLOAD_FORMAT {
                return Err(PlaintextError::Unsupported {
                    found: stored.format,
                    supported: PAYLOAD_FORMAT,
                });
            }
            if stored.format != PAYLOAD_FORMAT {
                return Err(PlaintextError::Malformed(format!(
                    "unrecorded payload format {}",
                    stored.format
                )));
            }
            let current = normalize_inner(stored.current)?;
            let versions = stored
                .versions
                .into_iter()
                .map(normalize_inner)
                .collect::<Result<Vec<_>, _>>()?;
            let limit = stored
                .version_history_limit
                .or(current.version_history_limit)
                .unwrap_or(DEFAULT_VERSION_HISTORY_LIMIT)
                .min(MAX_VERSION_HISTORY_LIMIT);
            Ok(VaultPayload {
                current,
                versions,
                version_history_limit: limit,
            })
        }
        PlaintextDocument::Legacy(state) => {
            let current = normalize_inner(state)?;
            let limit = current
                .version_history_limit
                .unwrap_or(DEFAULT_VERSION_HISTORY_LIMIT)
                .min(MAX_VERSION_HISTORY_LIMIT);
            Ok(VaultPayload {
                current,
                versions: Vec::new(),
                version_history_limit: limit,
            })
        }
    }
}

fn normalize_inner(state: VaultState) -> Result<VaultState, PlaintextError> {
    normalize(state).map_err(|e| match e {
        VaultError::UnsupportedFormat { found, supported } => {
            PlaintextError::Unsupported { found, supported }
        }
        other => PlaintextError::Malformed(other.to_string()),
    })
}

/// Serialize a payload to the format-2 plaintext wire shape.
pub(crate) fn serialize_payload(payload: &VaultPayload) -> Result<Vec<u8>, serde_json::Error> {
    let stored = StoredPayload {
        format: PAYLOAD_FORMAT,
        current: payload.current.clone(),
        versions: payload.versions.clone(),
        version_history_limit: Some(payload.version_history_limit),
    };
    serde_json::to_vec(&stored)
}
