use super::{user_facing, ClientExt};
use crate::models::{EntityId, MutationAck, Table};
use tauri::AppHandle;

#[tauri::command]
pub async fn get_tables_status(app: AppHandle) -> Result<Vec<Table>, String> {
    let client = app.client()?;
    user_facing(&app, client.queries().get_tables_status().await)
}

#[tauri::command]
pub async fn add_table(app: AppHandle, label: String) -> Result<MutationAck, String> {
    let client = app.client()?;
    user_facing(&app, client.dispatcher().add_table(&label).await)
}

#[tauri::command]
pub async fn delete_table(app: AppHandle, table_id: EntityId) -> Result<MutationAck, String> {
    let client = app.client()?;
    user_facing(&app, client.dispatcher().delete_table(&table_id).await)
}
