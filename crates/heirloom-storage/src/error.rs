//! Storage error types.
//!
//! Every variant carries enough context to diagnose the problem without a
//! debugger. Errors never contain vault contents — only paths and reasons.

/// Errors that can occur during vault store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to read the vault blob.
    #[error("failed to read vault from '{location}': {reason}")]
    Read { location: String, reason: String },

    /// Failed to write the vault blob.
    #[error("failed to write vault to '{location}': {reason}")]
    Write { location: String, reason: String },

    /// Failed to remove the vault blob.
    #[error("failed to clear vault at '{location}': {reason}")]
    Delete { location: String, reason: String },
}
