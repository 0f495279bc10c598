use super::{user_facing, ClientExt, ClientState, EventSink};
use crate::client::{PosClient, Session};
use crate::db::SettingsExt;
use crate::models::LoginUser;
use crate::views::{RenderedView, ViewId};
use std::sync::Arc;
use tauri::{AppHandle, Manager};

/// True when the setup screen must be shown instead of the login screen.
#[tauri::command]
pub fn needs_setup(app: AppHandle) -> bool {
    app.state::<ClientState>().current().is_none()
}

#[tauri::command]
pub async fn save_api_url(app: AppHandle, url: String) -> Result<String, String> {
    let endpoint = user_facing(&app, app.settings().save_endpoint(&url))?;

    let state = app.state::<ClientState>();
    let sink = Arc::new(EventSink::new(app.clone()));
    let client = user_facing(&app, PosClient::connect(endpoint.clone(), &state.config, sink))?;

    if let Some(previous) = state.replace(client) {
        previous.logout().await;
    }

    Ok(endpoint.to_string())
}

#[tauri::command]
pub async fn login(app: AppHandle, username: String, password: String) -> Result<LoginUser, String> {
    let client = app.client()?;
    // The login screen shows the message inline.
    client
        .login(&username, &password)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn browse_public(app: AppHandle) -> Result<ViewId, String> {
    let client = app.client()?;
    Ok(client.browse_public().await)
}

#[tauri::command]
pub async fn logout(app: AppHandle) -> Result<(), String> {
    let client = app.client()?;
    client.logout().await;
    Ok(())
}

#[tauri::command]
pub fn get_session(app: AppHandle) -> Result<Option<Session>, String> {
    Ok(app.client()?.session())
}

#[tauri::command]
pub fn show_view(app: AppHandle, view: ViewId) -> Result<RenderedView, String> {
    let client = app.client()?;
    user_facing(&app, client.show_view(view))
}

#[tauri::command]
pub fn get_active_view(app: AppHandle) -> Result<Option<ViewId>, String> {
    Ok(app.client()?.active_view())
}
