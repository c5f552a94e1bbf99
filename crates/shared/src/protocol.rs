use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::domain::{Product, ProductId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub uid: Option<UserId>,
    pub token: String,
    /// Expiry as Unix milliseconds.
    pub expired: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCheckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub uid: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Every mutating call wraps its body as `{"data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Product body sent on create and update, already coerced to wire types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub title: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    pub content: String,
    pub origin_price: Number,
    pub price: Number,
    pub is_enabled: u8,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "imagesUrl")]
    pub images_url: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Generic `{success, message}` body the service attaches to most answers.
/// `message` is a string on most failures and a list of strings on
/// validation failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceMessage {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<Value>,
}

impl ServiceMessage {
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
