use super::{user_facing, ClientExt};
use crate::dispatcher::parse_number;
use crate::models::{EntityId, InventoryLog, MutationAck, NewInventoryItem};
use tauri::AppHandle;

#[tauri::command]
pub async fn add_inventory_item(
    app: AppHandle,
    item: NewInventoryItem,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    user_facing(&app, client.dispatcher().add_inventory_item(item).await)
}

/// Stock entry; `quantity` comes straight from the prompt.
#[tauri::command]
pub async fn update_inventory(
    app: AppHandle,
    item_id: EntityId,
    quantity: String,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    let quantity = user_facing(&app, parse_number("Quantity", &quantity))?;
    let result = client
        .dispatcher()
        .update_inventory(&item_id, quantity)
        .await;
    user_facing(&app, result)
}

#[tauri::command]
pub async fn get_inventory_logs(app: AppHandle) -> Result<Vec<InventoryLog>, String> {
    let client = app.client()?;
    user_facing(&app, client.queries().get_inventory_logs().await)
}
