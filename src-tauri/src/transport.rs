//! Request/response plumbing for the action-based backend.
//!
//! Every call is a single round trip against one endpoint; the verb is carried
//! in an `action` parameter. The body is always read as text first and only
//! then parsed as JSON, so an HTML error page surfaces as
//! [`SyncError::InvalidResponse`] instead of masquerading as data.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// The backend only exempts simple content types from CORS preflight, so JSON
/// bodies are sent labelled as plain text.
pub const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Verbs the client depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    GetSyncData,
    CreateOrder,
    UpdateOrderStatus,
    GetProducts,
    AddProduct,
    UpdateProductPrice,
    GetRecipe,
    AddRecipeItem,
    DeleteRecipeItem,
    GetTablesStatus,
    AddTable,
    DeleteTable,
    AddInventoryItem,
    UpdateInventory,
    GetInventoryLogs,
    RegisterExpense,
    GetDashboardStats,
    GetAdvancedStats,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::GetSyncData => "getSyncData",
            Action::CreateOrder => "createOrder",
            Action::UpdateOrderStatus => "updateOrderStatus",
            Action::GetProducts => "getProducts",
            Action::AddProduct => "addProduct",
            Action::UpdateProductPrice => "updateProductPrice",
            Action::GetRecipe => "getRecipe",
            Action::AddRecipeItem => "addRecipeItem",
            Action::DeleteRecipeItem => "deleteRecipeItem",
            Action::GetTablesStatus => "getTablesStatus",
            Action::AddTable => "addTable",
            Action::DeleteTable => "deleteTable",
            Action::AddInventoryItem => "addInventoryItem",
            Action::UpdateInventory => "updateInventory",
            Action::GetInventoryLogs => "getInventoryLogs",
            Action::RegisterExpense => "registerExpense",
            Action::GetDashboardStats => "getDashboardStats",
            Action::GetAdvancedStats => "getAdvancedStats",
        }
    }

    /// Writes go out as POST, everything else as GET.
    pub fn method(&self) -> Method {
        match self {
            Action::CreateOrder
            | Action::UpdateOrderStatus
            | Action::AddProduct
            | Action::UpdateProductPrice
            | Action::AddRecipeItem
            | Action::DeleteRecipeItem
            | Action::AddTable
            | Action::DeleteTable
            | Action::AddInventoryItem
            | Action::UpdateInventory
            | Action::RegisterExpense => Method::Post,
            _ => Method::Get,
        }
    }

    /// Background polling; failures must never interrupt the operator.
    pub fn is_background(&self) -> bool {
        matches!(self, Action::GetSyncData)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one round trip and return the parsed JSON body, without
    /// interpreting `success`/`error` envelopes.
    async fn call(&self, action: Action, payload: Payload, method: Method) -> SyncResult<Value>;
}

/// [`Transport`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> SyncResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn round_trip(&self, action: Action, payload: Payload, method: Method) -> SyncResult<Value> {
        let request = match method {
            Method::Get => self
                .http_client
                .get(self.endpoint.clone())
                .query(&query_pairs(action, &payload)),
            Method::Post => self
                .http_client
                .post(self.endpoint.clone())
                .header(reqwest::header::CONTENT_TYPE, POST_CONTENT_TYPE)
                .body(post_body(action, payload)?),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(action = action.name(), status, "Received response");

        parse_body(&body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, action: Action, payload: Payload, method: Method) -> SyncResult<Value> {
        let result = self.round_trip(action, payload, method).await;

        if let Err(e) = &result {
            if action.is_background() {
                tracing::warn!(action = action.name(), error = %e, "Background request failed");
            } else {
                tracing::error!(action = action.name(), error = %e, "Request failed");
            }
        }

        result
    }
}

/// Query string for a GET: the action first, then each payload field.
/// Strings are sent raw, other values in their JSON form.
pub fn query_pairs(action: Action, payload: &Payload) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(payload.len() + 1);
    pairs.push(("action".to_string(), action.name().to_string()));

    for (key, value) in payload {
        if key == "action" {
            continue;
        }
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        pairs.push((key.clone(), value));
    }

    pairs
}

/// `{"action": <name>, ...payload}` serialized as text.
pub fn post_body(action: Action, payload: Payload) -> SyncResult<String> {
    let mut body = Map::with_capacity(payload.len() + 1);
    body.insert("action".to_string(), Value::String(action.name().to_string()));
    for (key, value) in payload {
        if key != "action" {
            body.insert(key, value);
        }
    }

    serde_json::to_string(&Value::Object(body))
        .map_err(|e| SyncError::InvalidResponse(format!("Unserializable payload: {}", e)))
}

pub fn parse_body(body: &str) -> SyncResult<Value> {
    serde_json::from_str(body).map_err(|e| {
        SyncError::InvalidResponse(format!("{} ({})", e, summarize_response_body(body)))
    })
}

fn summarize_response_body(body: &str) -> String {
    let head: String = body.trim_start().chars().take(40).collect();
    format!("len={}, starts={:?}", body.len(), head)
}

/// Turn `{success:false, ...}` and `{error: ...}` replies into
/// [`SyncError::Business`]; anything else passes through.
pub fn check_envelope(value: Value) -> SyncResult<Value> {
    if let Value::Object(map) = &value {
        if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
            return Err(SyncError::Business(message_text(error)));
        }
        if map.get("success").and_then(Value::as_bool) == Some(false) {
            let message = map
                .get("message")
                .filter(|m| !m.is_null())
                .map(message_text)
                .unwrap_or_else(|| "Request rejected by server".to_string());
            return Err(SyncError::Business(message));
        }
    }
    Ok(value)
}

/// A write acknowledgement must say `success: true` explicitly.
pub fn into_ack(value: Value) -> SyncResult<Map<String, Value>> {
    match check_envelope(value)? {
        Value::Object(mut map) if map.get("success").and_then(Value::as_bool) == Some(true) => {
            map.remove("success");
            Ok(map)
        }
        other => Err(SyncError::InvalidResponse(format!(
            "Expected an acknowledgement, got {}",
            summarize_response_body(&other.to_string())
        ))),
    }
}

/// Queries answer either with the bare array or with an object wrapping it
/// under its own name or under `data`.
pub fn extract_collection<T: DeserializeOwned>(value: Value, key: &str) -> SyncResult<Vec<T>> {
    let rows = match check_envelope(value)? {
        rows @ Value::Array(_) => rows,
        Value::Object(mut map) => match map.remove(key).or_else(|| map.remove("data")) {
            Some(rows @ Value::Array(_)) => rows,
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(other) => {
                return Err(SyncError::InvalidResponse(format!(
                    "Expected '{}' to be a list, got {}",
                    key,
                    summarize_response_body(&other.to_string())
                )))
            }
        },
        Value::Null => Value::Array(Vec::new()),
        other => {
            return Err(SyncError::InvalidResponse(format!(
                "Expected a list of {}, got {}",
                key,
                summarize_response_body(&other.to_string())
            )))
        }
    };

    serde_json::from_value(rows).map_err(|e| SyncError::InvalidResponse(e.to_string()))
}

/// Object-shaped query reply, optionally wrapped under `data`.
pub fn extract_object<T: DeserializeOwned>(value: Value) -> SyncResult<T> {
    let value = match check_envelope(value)? {
        Value::Object(mut map) if map.get("data").map(Value::is_object) == Some(true) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };

    serde_json::from_value(value).map_err(|e| SyncError::InvalidResponse(e.to_string()))
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
