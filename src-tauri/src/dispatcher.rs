//! Writes against the backend.
//!
//! A write never patches the store. Once the backend acknowledges it, one
//! resync is run for the session and the store changes only through that
//! reconcile pass. Rejected or failed writes leave the store as it was.

use crate::cart::Cart;
use crate::error::{SyncError, SyncResult};
use crate::models::{EntityId, MutationAck, NewExpense, NewInventoryItem, NewProduct, OrderStatus};
use crate::scheduler::SyncScheduler;
use crate::transport::{into_ack, Action, Payload, Transport};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Expense category used when none is given.
pub const DEFAULT_EXPENSE_CATEGORY: &str = "Insumos";

pub struct MutationDispatcher {
    transport: Arc<dyn Transport>,
    scheduler: Arc<SyncScheduler>,
}

impl MutationDispatcher {
    pub fn new(transport: Arc<dyn Transport>, scheduler: Arc<SyncScheduler>) -> Self {
        Self {
            transport,
            scheduler,
        }
    }

    async fn write(&self, action: Action, payload: Payload) -> SyncResult<MutationAck> {
        let value = self
            .transport
            .call(action, payload, action.method())
            .await?;

        let fields = into_ack(value).inspect_err(|e| {
            warn!(action = action.name(), error = %e, "Write rejected");
        })?;

        info!(action = action.name(), "Write acknowledged");

        let resynced = match self.scheduler.resync().await {
            Ok(_) => true,
            Err(e) => {
                warn!(action = action.name(), error = %e, "Resync after write failed");
                false
            }
        };

        Ok(MutationAck { fields, resynced })
    }

    pub async fn create_order(
        &self,
        cart: &Cart,
        table: &EntityId,
        waiter_id: &EntityId,
    ) -> SyncResult<MutationAck> {
        if cart.is_empty() {
            return Err(SyncError::Validation("Cart is empty".to_string()));
        }
        require_id("Table", table)?;
        require_id("Waiter", waiter_id)?;

        let payload = payload([("orderData", cart.order_data(table, waiter_id))]);
        self.write(Action::CreateOrder, payload).await
    }

    /// Send the cart as an order. The cart is emptied only once the backend
    /// has accepted it; on any failure it is left exactly as it was.
    pub async fn submit_order(
        &self,
        cart: &mut Cart,
        table: &EntityId,
        waiter_id: &EntityId,
    ) -> SyncResult<MutationAck> {
        let ack = self.create_order(cart, table, waiter_id).await?;
        cart.clear();
        Ok(ack)
    }

    pub async fn update_order_status(
        &self,
        order_id: &EntityId,
        status: OrderStatus,
    ) -> SyncResult<MutationAck> {
        require_id("Order", order_id)?;
        let payload = payload([("orderId", json!(order_id)), ("status", json!(status))]);
        self.write(Action::UpdateOrderStatus, payload).await
    }

    pub async fn add_table(&self, label: &str) -> SyncResult<MutationAck> {
        let label = require_text("Table name", label)?;
        self.write(Action::AddTable, payload([("label", json!(label))]))
            .await
    }

    pub async fn delete_table(&self, table_id: &EntityId) -> SyncResult<MutationAck> {
        require_id("Table", table_id)?;
        self.write(Action::DeleteTable, payload([("tableId", json!(table_id))]))
            .await
    }

    pub async fn add_product(&self, product: NewProduct) -> SyncResult<MutationAck> {
        let name = require_text("Product name", &product.name)?;
        let category = require_text("Category", &product.category)?;
        require_positive("Price", product.price)?;

        let data = json!({
            "name": name,
            "category": category,
            "price": product.price,
            "image_url": product.image_url.unwrap_or_default(),
        });
        self.write(Action::AddProduct, payload([("productData", data)]))
            .await
    }

    pub async fn update_product_price(
        &self,
        product_id: &EntityId,
        new_price: f64,
    ) -> SyncResult<MutationAck> {
        require_id("Product", product_id)?;
        require_positive("Price", new_price)?;
        let payload = payload([
            ("productId", json!(product_id)),
            ("newPrice", json!(new_price)),
        ]);
        self.write(Action::UpdateProductPrice, payload).await
    }

    pub async fn add_recipe_item(
        &self,
        product_id: &EntityId,
        ingredient_id: &EntityId,
        quantity: f64,
    ) -> SyncResult<MutationAck> {
        require_id("Product", product_id)?;
        require_id("Ingredient", ingredient_id)?;
        require_positive("Quantity", quantity)?;
        let payload = payload([
            ("productId", json!(product_id)),
            ("ingredientId", json!(ingredient_id)),
            ("quantity", json!(quantity)),
        ]);
        self.write(Action::AddRecipeItem, payload).await
    }

    pub async fn delete_recipe_item(
        &self,
        product_id: &EntityId,
        ingredient_id: &EntityId,
    ) -> SyncResult<MutationAck> {
        require_id("Product", product_id)?;
        require_id("Ingredient", ingredient_id)?;
        let payload = payload([
            ("productId", json!(product_id)),
            ("ingredientId", json!(ingredient_id)),
        ]);
        self.write(Action::DeleteRecipeItem, payload).await
    }

    pub async fn add_inventory_item(&self, item: NewInventoryItem) -> SyncResult<MutationAck> {
        let name = require_text("Item name", &item.name)?;
        let unit = require_text("Unit", &item.unit)?;
        require_non_negative("Current stock", item.current_stock)?;
        require_non_negative("Minimum stock", item.min_stock)?;

        let data = json!({
            "name": name,
            "unit": unit,
            "current_stock": item.current_stock,
            "min_stock": item.min_stock,
        });
        self.write(Action::AddInventoryItem, payload([("itemData", data)]))
            .await
    }

    /// Register a stock entry. The acknowledgement may carry `newStock`.
    pub async fn update_inventory(
        &self,
        item_id: &EntityId,
        quantity: f64,
    ) -> SyncResult<MutationAck> {
        require_id("Item", item_id)?;
        require_positive("Quantity", quantity)?;
        let payload = payload([("itemId", json!(item_id)), ("quantity", json!(quantity))]);
        self.write(Action::UpdateInventory, payload).await
    }

    pub async fn register_expense(
        &self,
        expense: NewExpense,
        user_id: &EntityId,
    ) -> SyncResult<MutationAck> {
        let description = require_text("Description", &expense.description)?;
        require_positive("Amount", expense.amount)?;
        let category = expense
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_EXPENSE_CATEGORY)
            .to_string();

        let data = json!({
            "description": description,
            "amount": expense.amount,
            "category": category,
            "userId": user_id,
        });
        self.write(Action::RegisterExpense, payload([("expenseData", data)]))
            .await
    }
}

fn payload<const N: usize>(fields: [(&str, Value); N]) -> Payload {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn require_text(label: &str, value: &str) -> SyncResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SyncError::Validation(format!("{} is required", label)));
    }
    Ok(value.to_string())
}

fn require_id(label: &str, id: &EntityId) -> SyncResult<()> {
    if id.is_blank() {
        return Err(SyncError::Validation(format!("{} id is required", label)));
    }
    Ok(())
}

fn require_positive(label: &str, value: f64) -> SyncResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SyncError::Validation(format!(
            "{} must be a number greater than zero",
            label
        )));
    }
    Ok(())
}

fn require_non_negative(label: &str, value: f64) -> SyncResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SyncError::Validation(format!(
            "{} must be a number of zero or more",
            label
        )));
    }
    Ok(())
}

/// Parse a number typed by the operator ("12.50", " 3 ").
pub fn parse_number(label: &str, raw: &str) -> SyncResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SyncError::Validation(format!("{} is required", label)));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| SyncError::Validation(format!("{} must be a number", label)))
}
