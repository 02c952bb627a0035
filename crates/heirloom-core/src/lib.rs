//! Core library for Heirloom — a local-first, passphrase-protected vault
//! for personal and administrative records.
//!
//! The vault is a single opaque file: PBKDF2-stretched passphrase key,
//! AES-256-GCM envelope, a versioned record schema with an append-only
//! migration chain, and a bounded ring of prior snapshots for point-in-time
//! recovery. This crate is a pure bytes↔state transform plus a thin session
//! layer; it depends on `heirloom-storage` for the store trait and performs
//! no I/O of its own outside the session.

pub mod cipher;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod migrate;
pub mod retention;
pub mod schema;
pub mod session;

pub use codec::{open, seal};
pub use error::{SessionError, VaultError};
pub use kdf::SaltLength;
pub use migrate::normalize;
pub use schema::{VaultPayload, VaultState};
pub use session::{SessionStatus, VaultSession};
