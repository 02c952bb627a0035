//! Snapshot retention engine.
//!
//! Every save pushes the outgoing current state onto the front of the
//! snapshot ring and evicts from the tail beyond the effective limit — a
//! simple bounded, newest-first history for point-in-time recovery. A limit
//! of 0 disables history entirely.

use crate::schema::{
    DEFAULT_VERSION_HISTORY_LIMIT, MAX_VERSION_HISTORY_LIMIT, VaultPayload, VaultState,
};

/// Build the payload to persist for a save.
///
/// The effective limit is taken from the new current state, falling back to
/// the previous payload, falling back to the default of
/// [`DEFAULT_VERSION_HISTORY_LIMIT`], and clamped to
/// [`MAX_VERSION_HISTORY_LIMIT`]. On the first save (`previous` is `None`)
/// the ring starts empty; afterwards the previous current state becomes the
/// newest snapshot and the ring is truncated to the limit.
#[must_use]
pub fn build_next_payload(previous: Option<&VaultPayload>, new_current: VaultState) -> VaultPayload {
    let limit = new_current
        .version_history_limit
        .or(previous.map(|p| p.version_history_limit))
        .unwrap_or(DEFAULT_VERSION_HISTORY_LIMIT)
        .min(MAX_VERSION_HISTORY_LIMIT);

    let mut current = new_current;
    current.version_history_limit = Some(limit);

    let versions = match previous {
        None => Vec::new(),
        Some(previous) => std::iter::once(previous.current.clone())
            .chain(previous.versions.iter().cloned())
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect(),
    };

    VaultPayload {
        current,
        versions,
        version_history_limit: limit,
    }
}
