//! Shared UI-facing application state with event notification.
//!
//! Tracks the current tag/note selection and republishes every transition
//! on the [`EventBus`]. Selection setters await full delivery, so callers
//! can rely on "the change has been observed everywhere" when they resume.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AppEvent, EventBus};

/// Application state holder and event publisher.
#[derive(Clone)]
pub struct AppState {
    bus: EventBus,
    selected_tag: Arc<RwLock<Option<Uuid>>>,
    selected_note: Arc<RwLock<Option<Uuid>>>,
}

impl AppState {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            selected_tag: Arc::new(RwLock::new(None)),
            selected_note: Arc::new(RwLock::new(None)),
        }
    }

    /// The bus this state publishes on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Select a tag; no event fires when the selection is unchanged.
    pub async fn set_selected_tag(&self, tag: Option<Uuid>) {
        let previous = {
            let mut selected = self.selected_tag.write().await;
            if *selected == tag {
                return;
            }
            std::mem::replace(&mut *selected, tag)
        };
        self.bus
            .publish(AppEvent::TagChanged, json!({ "previous_tag": previous }))
            .await;
    }

    /// Select a note, waiting until every observer has seen the change.
    pub async fn set_selected_note(&self, note: Option<Uuid>) {
        let previous = {
            let mut selected = self.selected_note.write().await;
            std::mem::replace(&mut *selected, note)
        };
        self.bus
            .publish(AppEvent::NoteChanged, json!({ "previous_note": previous }))
            .await;
    }

    pub async fn selected_tag(&self) -> Option<Uuid> {
        *self.selected_tag.read().await
    }

    pub async fn selected_note(&self) -> Option<Uuid> {
        *self.selected_note.read().await
    }

    /// Preferences were updated.
    pub async fn preferences_changed(&self) {
        self.bus
            .publish(AppEvent::PreferencesChanged, Value::Null)
            .await;
    }

    /// A panel was resized or collapsed.
    pub async fn panel_did_resize(&self, panel: &str, collapsed: bool) {
        self.bus
            .publish(
                AppEvent::PanelResized,
                json!({ "panel": panel, "collapsed": collapsed }),
            )
            .await;
    }

    /// The editor gained focus.
    pub async fn editor_did_focus(&self) {
        self.bus.publish(AppEvent::EditorFocused, Value::Null).await;
    }

    /// A backup download started.
    pub async fn began_backup_download(&self) {
        self.bus
            .publish(AppEvent::BeganBackupDownload, Value::Null)
            .await;
    }

    /// A backup download finished.
    pub async fn ended_backup_download(&self, success: bool) {
        self.bus
            .publish(AppEvent::EndedBackupDownload, json!({ "success": success }))
            .await;
    }

    /// The desktop extension host is ready.
    pub async fn desktop_extensions_ready(&self) {
        self.bus
            .publish(AppEvent::DesktopExtensionsReady, Value::Null)
            .await;
    }
}
