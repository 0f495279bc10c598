use super::{user_facing, ClientExt};
use crate::cart::Cart;
use crate::client::TableSelection;
use crate::models::{EntityId, MutationAck, OrderStatus};
use tauri::AppHandle;

#[tauri::command]
pub async fn select_table(app: AppHandle, table_id: EntityId) -> Result<TableSelection, String> {
    let client = app.client()?;
    user_facing(&app, client.select_table(&table_id).await)
}

#[tauri::command]
pub async fn get_cart(app: AppHandle) -> Result<Cart, String> {
    Ok(app.client()?.cart().await)
}

#[tauri::command]
pub async fn add_to_cart(app: AppHandle, product_id: EntityId) -> Result<Cart, String> {
    let client = app.client()?;
    user_facing(&app, client.add_to_cart(&product_id).await)
}

#[tauri::command]
pub async fn remove_from_cart(app: AppHandle, product_id: EntityId) -> Result<Cart, String> {
    let client = app.client()?;
    user_facing(&app, client.remove_from_cart(&product_id).await)
}

#[tauri::command]
pub async fn submit_order(app: AppHandle, table_id: Option<EntityId>) -> Result<MutationAck, String> {
    let client = app.client()?;
    user_facing(&app, client.submit_order(table_id).await)
}

/// Kitchen marks ready, cashier marks paid.
#[tauri::command]
pub async fn update_order_status(
    app: AppHandle,
    order_id: EntityId,
    status: OrderStatus,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    let result = client
        .dispatcher()
        .update_order_status(&order_id, status)
        .await;
    user_facing(&app, result)
}
