//! Per-field coercions over untrusted JSON objects.

use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

/// The value at `key` if it is text, otherwise `""`.
pub(crate) fn text(raw: &Object, key: &str) -> String {
    text_or(raw, key, "")
}

pub(crate) fn text_or(raw: &Object, key: &str, fallback: &str) -> String {
    optional_text(raw, key).unwrap_or_else(|| fallback.to_string())
}

pub(crate) fn optional_text(raw: &Object, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Integral millisecond values; fractional numbers are truncated.
pub(crate) fn optional_millis(raw: &Object, key: &str) -> Option<i64> {
    let value = raw.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

pub(crate) fn object<'a>(raw: &'a Object, key: &str) -> Option<&'a Object> {
    raw.get(key).and_then(Value::as_object)
}

pub(crate) fn array<'a>(raw: &'a Object, key: &str) -> Option<&'a Vec<Value>> {
    raw.get(key).and_then(Value::as_array)
}

pub(crate) fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
