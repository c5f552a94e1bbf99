use std::{collections::BTreeMap, fmt};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ProductId);
id_newtype!(UserId);

/// A catalog row as returned by the admin product listing.
///
/// Prices and the enabled flag are read loosely: the service stores whatever
/// the last writer sent, so numeric strings and `true`/`false` show up next to
/// the canonical numbers and `1`/`0`. Unknown attributes are kept in `extra`
/// and written back on update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "loose_number")]
    pub origin_price: f64,
    #[serde(default, deserialize_with = "loose_number")]
    pub price: f64,
    #[serde(default, deserialize_with = "loose_flag", serialize_with = "flag_as_int")]
    pub is_enabled: bool,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(
        rename = "imagesUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub images_url: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Product {
    pub fn enabled_label(&self) -> &'static str {
        if self.is_enabled {
            "enabled"
        } else {
            "disabled"
        }
    }
}

/// Renders a price the way a number input would show it: integral values
/// without a trailing `.0`.
pub fn format_price(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn loose_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("price is not representable as f64")),
        Value::String(s) => Ok(s.trim().parse::<f64>().unwrap_or(0.0)),
        Value::Null => Ok(0.0),
        other => Err(de::Error::custom(format!("unexpected price value: {other}"))),
    }
}

fn loose_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v > 0.0)),
        Value::String(s) => Ok(matches!(s.trim(), "1" | "true")),
        Value::Null => Ok(false),
        other => Err(de::Error::custom(format!(
            "unexpected is_enabled value: {other}"
        ))),
    }
}

fn flag_as_int<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}
