//! Moving values between `Value`, `serde_json::Value` and serde types.
//!
//! JSON has no form for every `Value`. Bytes travel as base64 strings. A NaN
//! or infinite float has no JSON form at all and is an encode error, so a
//! typed projection never sees a float silently turned into null.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Value};

/// Deserialize a Rust type out of a Value.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let json = value_to_json(&value)?;
    serde_json::from_value(json).map_err(|e| Error::decode(e.to_string()))
}

/// Serialize a Rust type into a Value.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::encode(e.to_string()))?;
    Ok(json_to_value(json))
}

/// The JSON form of `value`.
///
/// # Errors
///
/// `Error::Encode` naming the offending position when a float is NaN or
/// infinite.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, Error> {
    encode_at(value, &mut Vec::new())
}

fn encode_at(value: &Value, path: &mut Vec<String>) -> Result<serde_json::Value, Error> {
    let json = match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::from(*b),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => serde_json::Value::Number(n),
            None => {
                let at = if path.is_empty() {
                    "value".to_string()
                } else {
                    path.join(".")
                };
                return Err(Error::encode(format!("float {f} at {at} has no JSON form")));
            }
        },
        Value::String(s) => serde_json::Value::from(s.as_str()),
        Value::Bytes(b) => {
            serde_json::Value::from(base64::engine::general_purpose::STANDARD.encode(b))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(i.to_string());
                out.push(encode_at(item, path)?);
                path.pop();
            }
            serde_json::Value::Array(out)
        }
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (key, item) in map {
                path.push(key.clone());
                out.insert(key.clone(), encode_at(item, path)?);
                path.pop();
            }
            serde_json::Value::Object(out)
        }
    };
    Ok(json)
}

/// The `Value` form of a JSON document.
///
/// Integers that fit in `i64` stay integers. Anything wider, such as a
/// `u64` above `i64::MAX`, becomes a float.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            // Every JSON number has an f64 form without arbitrary precision.
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}
