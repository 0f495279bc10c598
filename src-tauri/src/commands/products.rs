use super::{user_facing, ClientExt};
use crate::dispatcher::parse_number;
use crate::models::{EntityId, MutationAck, NewProduct, Product, RecipeItem};
use tauri::AppHandle;

#[tauri::command]
pub async fn get_products(app: AppHandle) -> Result<Vec<Product>, String> {
    let client = app.client()?;
    user_facing(&app, client.queries().get_products().await)
}

#[tauri::command]
pub async fn add_product(app: AppHandle, product: NewProduct) -> Result<MutationAck, String> {
    let client = app.client()?;
    user_facing(&app, client.dispatcher().add_product(product).await)
}

/// `new_price` is the raw text from the price prompt.
#[tauri::command]
pub async fn update_product_price(
    app: AppHandle,
    product_id: EntityId,
    new_price: String,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    let price = user_facing(&app, parse_number("Price", &new_price))?;
    let result = client
        .dispatcher()
        .update_product_price(&product_id, price)
        .await;
    user_facing(&app, result)
}

#[tauri::command]
pub async fn get_recipe(app: AppHandle, product_id: EntityId) -> Result<Vec<RecipeItem>, String> {
    let client = app.client()?;
    user_facing(&app, client.queries().get_recipe(&product_id).await)
}

#[tauri::command]
pub async fn add_recipe_item(
    app: AppHandle,
    product_id: EntityId,
    ingredient_id: EntityId,
    quantity: String,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    let quantity = user_facing(&app, parse_number("Quantity", &quantity))?;
    let result = client
        .dispatcher()
        .add_recipe_item(&product_id, &ingredient_id, quantity)
        .await;
    user_facing(&app, result)
}

#[tauri::command]
pub async fn delete_recipe_item(
    app: AppHandle,
    product_id: EntityId,
    ingredient_id: EntityId,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    let result = client
        .dispatcher()
        .delete_recipe_item(&product_id, &ingredient_id)
        .await;
    user_facing(&app, result)
}
