//! Item model for the sync client.
//!
//! Items are the unit of storage and sync: notes, tags, and installable
//! components all travel through the same pipeline. Content is opaque to
//! this layer; encryption fields (`enc_item_key`, `auth_hash`) are managed
//! by the crypto engine and stripped when an item is re-treated as
//! plaintext (e.g. after a backup import).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type of an item.
///
/// Stored as a plain string on the wire; the closed variants exist so
/// callers can match without string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    Note,
    Tag,
    /// Installable extension/component. Imports force these inactive so a
    /// corrupted or malicious backup cannot auto-execute.
    Component,
    Other(String),
}

impl From<String> for ContentType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Note" => ContentType::Note,
            "Tag" => ContentType::Tag,
            "Component" => ContentType::Component,
            _ => ContentType::Other(s),
        }
    }
}

impl From<ContentType> for String {
    fn from(ct: ContentType) -> Self {
        match ct {
            ContentType::Note => "Note".to_string(),
            ContentType::Tag => "Tag".to_string(),
            ContentType::Component => "Component".to_string(),
            ContentType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: String = self.clone().into();
        write!(f, "{}", s)
    }
}

/// A single syncable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub uuid: Uuid,

    /// Content type ("Note", "Tag", "Component", ...)
    pub content_type: ContentType,

    /// Opaque content; decrypted form when `error_decrypting` is false
    #[serde(default)]
    pub content: serde_json::Value,

    /// Per-item encrypted key, present on encrypted payloads
    #[serde(default)]
    pub enc_item_key: Option<String>,

    /// Integrity hash over the encrypted payload
    #[serde(default)]
    pub auth_hash: Option<String>,

    /// Whether this item has local changes not yet confirmed remotely
    #[serde(default)]
    pub dirty: bool,

    /// Set by the crypto engine when non-throwing decryption failed
    #[serde(default)]
    pub error_decrypting: bool,

    /// Whether a component item is active (ignored for other types)
    #[serde(default)]
    pub active: bool,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last local modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item of the given type with empty content.
    pub fn new(content_type: ContentType) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            content_type,
            content: serde_json::Value::Null,
            enc_item_key: None,
            auth_hash: None,
            dirty: false,
            error_decrypting: false,
            active: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set content (builder style).
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// Mark the item as having unsynced local changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.updated_at = Utc::now();
    }

    /// Assign a fresh identifier, so the item cannot collide with one
    /// already owned by a remote account.
    pub fn alternate_uuid(&mut self) {
        self.uuid = Uuid::new_v4();
    }

    /// Clear the encryption fields so the item is treated as plaintext on
    /// merge.
    pub fn strip_encryption_fields(&mut self) {
        self.enc_item_key = None;
        self.auth_hash = None;
    }

    /// Whether this item is an installable component.
    pub fn is_component(&self) -> bool {
        self.content_type == ContentType::Component
    }
}

/// Key material used to encrypt/decrypt items.
///
/// Derived by the crypto engine from a password and auth parameters, or
/// fetched from the authenticated session. Opaque at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    /// Master encryption key
    pub master_key: String,

    /// Authentication key for integrity hashes
    pub auth_key: String,
}

impl KeyMaterial {
    pub fn new(master_key: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            master_key: master_key.into(),
            auth_key: auth_key.into(),
        }
    }
}

/// Authentication parameters (KDF settings, salts, protocol version).
///
/// Produced and consumed by the identity and crypto engines; opaque here.
pub type AuthParams = serde_json::Value;
