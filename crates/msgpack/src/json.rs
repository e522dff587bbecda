//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON has no binary type, so bytes travel as
//! `data:application/octet-stream;base64,...` strings, and such strings turn
//! back into [`Value::Bytes`]. An extension becomes
//! `{"type": <id>, "data": <data uri>}`.
//!
//! The mapping is lossy in both directions: text that happens to start with
//! the data URI prefix, or a map holding exactly `type` and `data` keys of
//! the extension shape, cannot be told apart from bytes and extensions once
//! they are JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value as JsonValue};

use crate::{Extension, Value};

const BIN_PREFIX: &str = "data:application/octet-stream;base64,";

fn bin_uri(bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(BIN_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    uri.push_str(BIN_PREFIX);
    STANDARD.encode_string(bytes, &mut uri);
    uri
}

fn key_text(key: Value) -> String {
    match key {
        Value::Text(s) => s,
        other => JsonValue::from(other).to_string(),
    }
}

/// Non-text map keys become their JSON text, so `{1: ..}` and `{"1": ..}`
/// convert to the same object.
impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Int(i) => {
                if let Ok(n) = i64::try_from(i) {
                    JsonValue::Number(n.into())
                } else if let Ok(n) = u64::try_from(i) {
                    JsonValue::Number(n.into())
                } else {
                    Number::from_f64(i as f64).map_or(JsonValue::Null, JsonValue::Number)
                }
            }
            // NaN and the infinities have no JSON form.
            Value::Float(f) => Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Text(s) => JsonValue::String(s),
            Value::Bytes(b) => JsonValue::String(bin_uri(&b)),
            Value::Array(items) => JsonValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Map(pairs) => {
                let mut map = Map::with_capacity(pairs.len());
                for (k, v) in pairs {
                    map.insert(key_text(k), v.into());
                }
                JsonValue::Object(map)
            }
            Value::Extension(ext) => {
                let mut map = Map::with_capacity(2);
                map.insert("type".to_owned(), JsonValue::from(ext.type_id));
                map.insert("data".to_owned(), JsonValue::String(bin_uri(&ext.payload)));
                JsonValue::Object(map)
            }
        }
    }
}

/// Strings carrying the binary data URI prefix (with valid base64) decode to
/// [`Value::Bytes`]; objects shaped `{"type": i8, "data": <data uri>}` decode
/// to [`Value::Extension`]. Everything else maps one to one.
impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Nil,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i as i128)
                } else if let Some(u) = n.as_u64() {
                    Value::Int(u as i128)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => match s
                .strip_prefix(BIN_PREFIX)
                .and_then(|b64| STANDARD.decode(b64).ok())
            {
                Some(bytes) => Value::Bytes(bytes),
                None => Value::Text(s),
            },
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            JsonValue::Object(map) => {
                if let Some(ext) = as_extension(&map) {
                    return Value::Extension(ext);
                }
                Value::Map(
                    map.into_iter()
                        .map(|(k, v)| (Value::Text(k), v.into()))
                        .collect(),
                )
            }
        }
    }
}

fn as_extension(map: &Map<String, JsonValue>) -> Option<Extension> {
    if map.len() != 2 {
        return None;
    }
    let type_id = i8::try_from(map.get("type")?.as_i64()?).ok()?;
    let payload = STANDARD
        .decode(map.get("data")?.as_str()?.strip_prefix(BIN_PREFIX)?)
        .ok()?;
    Some(Extension::new(type_id, payload))
}
