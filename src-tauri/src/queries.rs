//! Read-only calls outside the snapshot. Results go straight back to the
//! caller (recipe dialogs, stock history, reports); none of them touch the
//! local store.

use crate::error::{SyncError, SyncResult};
use crate::models::{DashboardStats, EntityId, InventoryLog, LoginUser, Product, RecipeItem, Stats, Table};
use crate::transport::{extract_collection, extract_object, Action, Payload, Transport};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Queries {
    transport: Arc<dyn Transport>,
}

impl Queries {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch(&self, action: Action, payload: Payload) -> SyncResult<Value> {
        self.transport
            .call(action, payload, action.method())
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> SyncResult<LoginUser> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SyncError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let mut payload = Payload::new();
        payload.insert("username".to_string(), json!(username.trim()));
        payload.insert("password".to_string(), json!(password));

        let value = self.fetch(Action::Login, payload).await?;
        if value.get("success").and_then(Value::as_bool) != Some(true) {
            let message = value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or("Login failed");
            return Err(SyncError::Business(message.to_string()));
        }

        let role_name = value
            .get("role")
            .and_then(Value::as_str)
            .map(|r| r.trim().to_string());
        let mut user: LoginUser =
            serde_json::from_value(value).map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        user.role_name = role_name;
        Ok(user)
    }

    pub async fn get_products(&self) -> SyncResult<Vec<Product>> {
        let value = self.fetch(Action::GetProducts, Payload::new()).await?;
        extract_collection(value, "products")
    }

    pub async fn get_recipe(&self, product_id: &EntityId) -> SyncResult<Vec<RecipeItem>> {
        let mut payload = Payload::new();
        payload.insert("productId".to_string(), json!(product_id));
        let value = self.fetch(Action::GetRecipe, payload).await?;
        extract_collection(value, "recipe")
    }

    pub async fn get_tables_status(&self) -> SyncResult<Vec<Table>> {
        let value = self.fetch(Action::GetTablesStatus, Payload::new()).await?;
        extract_collection(value, "tables")
    }

    pub async fn get_inventory_logs(&self) -> SyncResult<Vec<InventoryLog>> {
        let value = self.fetch(Action::GetInventoryLogs, Payload::new()).await?;
        extract_collection(value, "logs")
    }

    pub async fn get_dashboard_stats(&self) -> SyncResult<DashboardStats> {
        let value = self.fetch(Action::GetDashboardStats, Payload::new()).await?;
        extract_object(value)
    }

    pub async fn get_advanced_stats(&self, period: Option<&str>) -> SyncResult<Stats> {
        let mut payload = Payload::new();
        if let Some(period) = period {
            payload.insert("period".to_string(), json!(period));
        }
        let value = self.fetch(Action::GetAdvancedStats, payload).await?;
        extract_object(value)
    }
}
