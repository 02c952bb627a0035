//! Vault data model.
//!
//! The in-memory record structure, format version 4. Wire field names are
//! camelCase and fixed by files already in the wild; the state's own format
//! version is serialized as `version`.
//!
//! Enumerations that older code kept as strings (history actions, uploaded
//! key kinds, scalar field values) are closed enums here, so an unhandled
//! case is a compile-time error — this matters most in the migration chain,
//! where every historical shape must be handled explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The current vault state format version.
pub const CURRENT_FORMAT_VERSION: u32 = 4;

/// Maximum retained history entries; the oldest beyond this are dropped.
pub const HISTORY_CAP: usize = 500;

/// Default number of prior snapshots kept in the vault file.
pub const DEFAULT_VERSION_HISTORY_LIMIT: u32 = 10;

/// Upper bound on the snapshot limit a state may request.
pub const MAX_VERSION_HISTORY_LIMIT: u32 = 100;

/// A scalar field value inside an entry section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Free text.
    Text(String),
}

/// Field values for one section, keyed by field id.
pub type SectionData = BTreeMap<String, ScalarValue>;

/// A titled record built from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Immutable, globally unique within a vault.
    pub id: Uuid,
    pub template_id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    /// Section data keyed by section id.
    #[serde(default)]
    pub sections: BTreeMap<String, SectionData>,
    /// Optional category. A dangling reference is displayed as
    /// "uncategorized" by callers, never treated as a fatal error here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

/// A category for grouping entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    StoreCreated,
    VaultImported,
    EntryCreated,
    EntryUpdated,
    EntryDeleted,
}

/// One line of the append-only change log. Newest-first in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Kind of an uploaded key blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Ssh,
    Cert,
}

/// An uploaded SSH key or certificate.
///
/// Content is stored raw — the outer encryption already covers it, so no
/// per-item integrity tag is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedKey {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KeyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub content_base64: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The vault state — the "current" schema at [`CURRENT_FORMAT_VERSION`].
///
/// A state read from storage is always normalized to the current format
/// before being handed to callers; `format_version` only moves forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultState {
    /// Format version. Serialized as `version` on the wire.
    #[serde(rename = "version")]
    pub format_version: u32,
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Categories for grouping entries. Format version 2+.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Free-text guide for successors. Format version 3+.
    #[serde(default)]
    pub successor_guide: String,
    /// Append-only change log, newest-first, capped at [`HISTORY_CAP`].
    /// Format version 3+.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Uploaded key/cert blobs. Format version 3+.
    #[serde(default)]
    pub uploaded_keys: Vec<UploadedKey>,
    /// User's nickname for display. Format version 4+.
    #[serde(default)]
    pub user_aka: String,
    /// Max snapshots to keep in the file, 0–100. Absent in old states;
    /// normalization fills in the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_history_limit: Option<u32>,
    /// Auto-lock timeout in minutes. 0 = disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_lock_minutes: Option<u32>,
    /// Salt length in bytes for the next save. 16 or 32.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_length: Option<u32>,
}

impl VaultState {
    /// An empty state at the current format version with default settings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            entries: Vec::new(),
            categories: Vec::new(),
            successor_guide: String::new(),
            history: Vec::new(),
            uploaded_keys: Vec::new(),
            user_aka: String::new(),
            version_history_limit: Some(DEFAULT_VERSION_HISTORY_LIMIT),
            auto_lock_minutes: None,
            salt_length: None,
        }
    }
}

/// The decrypted vault file payload: current state plus the snapshot ring.
///
/// `versions` is newest-first and never contains the in-flight current
/// state, only previously saved ones. Its length never exceeds
/// `version_history_limit` after a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPayload {
    pub current: VaultState,
    pub versions: Vec<VaultState>,
    pub version_history_limit: u32,
}

/// Push a history entry onto the front of the log, dropping the oldest
/// beyond [`HISTORY_CAP`].
#[must_use]
pub fn append_history(
    history: &[HistoryEntry],
    action: HistoryAction,
    entry_id: Option<Uuid>,
    entry_title: Option<String>,
    summary: Option<String>,
) -> Vec<HistoryEntry> {
    let head = HistoryEntry {
        at: Utc::now(),
        action,
        entry_id,
        entry_title,
        summary,
    };
    std::iter::once(head)
        .chain(history.iter().cloned())
        .take(HISTORY_CAP)
        .collect()
}

/// Create a new entry with empty sections for a template.
///
/// An empty title falls back to `"Untitled"`.
#[must_use]
pub fn new_entry(template_id: &str, title: &str, category_id: Option<Uuid>) -> Entry {
    Entry {
        id: Uuid::new_v4(),
        template_id: template_id.to_owned(),
        title: if title.is_empty() {
            "Untitled".to_owned()
        } else {
            title.to_owned()
        },
        updated_at: Utc::now(),
        sections: BTreeMap::new(),
        category_id,
    }
}

/// The initial payload for a brand-new vault: an empty current state whose
/// history opens with a `store_created` entry, and an empty snapshot ring.
#[must_use]
pub fn initial_payload() -> VaultPayload {
    let mut current = VaultState::empty();
    current.history = append_history(&[], HistoryAction::StoreCreated, None, None, None);
    VaultPayload {
        current,
        versions: Vec::new(),
        version_history_limit: DEFAULT_VERSION_HISTORY_LIMIT,
    }
}
