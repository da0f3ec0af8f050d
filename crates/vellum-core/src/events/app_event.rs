//! Application-wide event kinds.
//!
//! Event kinds are stable identifiers known to all subscribers ahead of
//! time; payloads are opaque JSON. Events originating in the sync engine
//! are relayed verbatim through [`AppEvent::Sync`].

use serde::{Deserialize, Serialize};

/// Event kind published on the application [`EventBus`](super::EventBus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppEvent {
    /// The selected tag changed; payload carries the previous tag
    TagChanged,
    /// The selected note changed; payload carries the previous note
    NoteChanged,
    /// User preferences were updated
    PreferencesChanged,
    /// A UI panel was resized or collapsed; payload: `{panel, collapsed}`
    PanelResized,
    /// The editor gained focus
    EditorFocused,
    /// A backup download began
    BeganBackupDownload,
    /// A backup download ended; payload: `{success}`
    EndedBackupDownload,
    /// The desktop extension host finished starting
    DesktopExtensionsReady,
    /// Local persisted items finished loading at startup
    InitialDataLoaded,
    /// The local data set is about to be rebuilt (reconciliation)
    MajorDataChange,
    /// An event relayed verbatim from the sync engine
    Sync(SyncEventKind),
}

/// Event names emitted by the sync engine.
///
/// The closed variants are the names this layer reacts to; anything else
/// the engine emits relays through [`SyncEventKind::Other`] so the
/// republish stays verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEventKind {
    /// The server rejected the session; re-authentication is required
    SessionInvalid,
    /// The engine hit an unexpected exception during a pass
    SyncException,
    /// One incremental sync pass completed
    SingleSyncCompleted,
    /// A full (cursor-reset) sync completed
    FullSyncCompleted,
    /// Any other engine-defined event name
    Other(String),
}

impl SyncEventKind {
    /// Parse an engine event name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "sync-session-invalid" => Self::SessionInvalid,
            "sync-exception" => Self::SyncException,
            "single-sync-completed" => Self::SingleSyncCompleted,
            "full-sync-completed" => Self::FullSyncCompleted,
            other => Self::Other(other.to_string()),
        }
    }

    /// The engine-side event name.
    pub fn name(&self) -> &str {
        match self {
            Self::SessionInvalid => "sync-session-invalid",
            Self::SyncException => "sync-exception",
            Self::SingleSyncCompleted => "single-sync-completed",
            Self::FullSyncCompleted => "full-sync-completed",
            Self::Other(name) => name,
        }
    }
}
