use crate::error::{SyncError, SyncResult};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Record identifier as the backend sends it. Sheet-backed ids arrive either
/// as numbers (`1`) or as codes (`"P1"`, `"I-01"`); the original form is kept
/// so it round-trips unchanged in write payloads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    pub fn is_blank(&self) -> bool {
        matches!(self, EntityId::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

/// Accepts a JSON number, a numeric string or null. Spreadsheet backends
/// frequently hand numbers back as text.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("number out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s.trim().parse::<f64>().map_err(de::Error::custom),
        Value::Null => Ok(0.0),
        other => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "mozo")]
    Waiter,
    #[serde(alias = "cocina")]
    Kitchen,
    #[serde(alias = "cajero", alias = "caja")]
    Cashier,
    #[default]
    Public,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
            Role::Cashier => "cashier",
            Role::Public => "public",
        }
    }

    /// Roles allowed to build and submit a cart.
    pub fn can_take_orders(&self) -> bool {
        matches!(self, Role::Admin | Role::Waiter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Free,
    Occupied,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Table {
    pub id: EntityId,
    #[serde(default)]
    pub label: Option<String>,
    pub status: TableStatus,
    #[serde(default)]
    pub orders: Vec<EntityId>,
}

impl Table {
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => format!("Table {}", self.id),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Cooking,
    Ready,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Ready => "ready",
            OrderStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
}

impl OrderItem {
    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("?")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    pub id: EntityId,
    pub table_number: EntityId,
    #[serde(default)]
    pub waiter_id: Option<EntityId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_stock: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_stock: f64,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < self.min_stock
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Expense {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub description: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Aggregates computed server-side. Row shapes are backend-defined, so they
/// are carried through untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub top_products: Vec<Value>,
    #[serde(default)]
    pub waiter_performance: Vec<Value>,
    #[serde(default)]
    pub period: Option<String>,
}

/// One `getSyncData` reply. Every collection is optional; an absent (or null)
/// collection means "not included", never "empty".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Snapshot {
    #[serde(default)]
    pub tables: Option<Vec<Table>>,
    #[serde(default)]
    pub products: Option<Vec<Product>>,
    #[serde(default)]
    pub orders: Option<Vec<Order>>,
    #[serde(default)]
    pub inventory: Option<Vec<InventoryItem>>,
    #[serde(default)]
    pub expenses: Option<Vec<Expense>>,
    #[serde(default)]
    pub stats: Option<Stats>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl Snapshot {
    /// Decode a `getSyncData` reply one section at a time. A section that
    /// does not decode is logged and treated as not included, so the cached
    /// copy stays and the other sections still apply.
    pub fn from_reply(value: Value) -> SyncResult<Self> {
        let Value::Object(mut sections) = value else {
            return Err(SyncError::InvalidResponse(format!(
                "Expected a snapshot object, got {}",
                value
            )));
        };

        Ok(Snapshot {
            tables: take_section(&mut sections, "tables"),
            products: take_section(&mut sections, "products"),
            orders: take_section(&mut sections, "orders"),
            inventory: take_section(&mut sections, "inventory"),
            expenses: take_section(&mut sections, "expenses"),
            stats: take_section(&mut sections, "stats"),
            timestamp: sections.remove("timestamp").filter(|t| !t.is_null()),
        })
    }
}

fn take_section<T: DeserializeOwned>(sections: &mut Map<String, Value>, key: &str) -> Option<T> {
    match sections.remove(key)? {
        Value::Null => None,
        raw => match serde_json::from_value(raw) {
            Ok(section) => Some(section),
            Err(e) => {
                warn!(section = key, error = %e, "Skipping undecodable snapshot section");
                None
            }
        },
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoginUser {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
    /// Role exactly as the backend spelled it (`"mozo"`, `"cajero"`), echoed
    /// back when asking for the session's snapshot.
    #[serde(skip)]
    pub role_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeItem {
    #[serde(default)]
    pub ingredient_id: Option<EntityId>,
    #[serde(default)]
    pub ingredient_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryLog {
    #[serde(default)]
    pub item_id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user_id: Option<EntityId>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_sales: f64,
    #[serde(default)]
    pub order_count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewInventoryItem {
    pub name: String,
    pub unit: String,
    pub current_stock: f64,
    pub min_stock: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
}

/// Server acknowledgement of a write, minus the `success` flag.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct MutationAck {
    pub fields: serde_json::Map<String, Value>,
    /// Whether the follow-up resync reached the store.
    pub resynced: bool,
}

impl MutationAck {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
