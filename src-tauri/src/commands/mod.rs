pub mod inventory;
pub mod orders;
pub mod products;
pub mod reports;
pub mod session;
pub mod tables;

use crate::client::PosClient;
use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::views::{RenderSink, RenderedView, ViewId};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

/// Event carrying every rendered view to the webview.
pub const VIEW_RENDERED_EVENT: &str = "view_rendered";

#[derive(Serialize, Clone)]
struct ViewRenderedPayload<'a> {
    view: ViewId,
    rendered: &'a RenderedView,
}

/// Forwards rendered views to the frontend as Tauri events.
pub struct EventSink {
    app: AppHandle,
}

impl EventSink {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl RenderSink for EventSink {
    fn present(&self, view: ViewId, rendered: &RenderedView) {
        if let Err(e) = self
            .app
            .emit(VIEW_RENDERED_EVENT, ViewRenderedPayload { view, rendered })
        {
            tracing::warn!(view = %view, error = %e, "Failed to emit rendered view");
        }
    }
}

/// The client exists only once an endpoint has been configured.
pub struct ClientState {
    client: RwLock<Option<Arc<PosClient>>>,
    pub config: ClientConfig,
}

impl ClientState {
    pub fn new(client: Option<PosClient>, config: ClientConfig) -> Self {
        Self {
            client: RwLock::new(client.map(Arc::new)),
            config,
        }
    }

    pub fn current(&self) -> Option<Arc<PosClient>> {
        self.client
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn replace(&self, client: PosClient) -> Option<Arc<PosClient>> {
        self.client
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .replace(Arc::new(client))
    }
}

pub trait ClientExt {
    fn client(&self) -> Result<Arc<PosClient>, String>;
}

impl ClientExt for AppHandle {
    fn client(&self) -> Result<Arc<PosClient>, String> {
        self.state::<ClientState>()
            .current()
            .ok_or_else(|| SyncError::NotConfigured.to_string())
    }
}

/// Result of an operator action: failures are shown in a modal error dialog
/// and handed back to the caller as text.
pub fn user_facing<T>(app: &AppHandle, result: SyncResult<T>) -> Result<T, String> {
    result.map_err(|e| {
        let message = e.to_string();
        app.dialog()
            .message(message.clone())
            .kind(MessageDialogKind::Error)
            .title("Coffee Bell")
            .show(|_| {});
        message
    })
}
