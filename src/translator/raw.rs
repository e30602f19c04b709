use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::common::events::{BillingAddress, BillingInfo, ContactPerson, DeliveryAddress};
use crate::common::json_guard::{check_json_limits, JsonLimits};

/// Account change notification as delivered by the CDC feed. Nothing in it
/// is trusted yet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawChangeEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub replay_id: String,

    pub billing_address: Option<BillingAddress>,
    pub delivery_address: Option<DeliveryAddress>,
    pub billing_info: Option<BillingInfo>,
    pub primary_contact: Option<ContactPerson>,

    #[serde(deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "utc_timestamp")]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub changed_fields: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publisher: String,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload rejected by guard: {0}")]
    Guard(&'static str),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
    #[error("payload deserialized to an empty document")]
    Empty,
}

pub fn parse(payload: &[u8], limits: JsonLimits) -> Result<RawChangeEvent, ParseError> {
    check_json_limits(payload, limits).map_err(ParseError::Guard)?;

    let value: Value = serde_json::from_slice(payload)?;
    match value {
        Value::Object(_) => Ok(RawChangeEvent::deserialize(value)?),
        Value::Null => Err(ParseError::Empty),
        Value::Bool(_) => Err(ParseError::NotAnObject("boolean")),
        Value::Number(_) => Err(ParseError::NotAnObject("number")),
        Value::String(_) => Err(ParseError::NotAnObject("string")),
        Value::Array(_) => Err(ParseError::NotAnObject("array")),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps without an offset are taken as UTC.
fn utc_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(stamp) = raw.parse::<DateTime<Utc>>() {
        return Ok(Some(stamp));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid LastModifiedDate {raw:?}: {e}")))
}
