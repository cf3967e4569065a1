use serde_json::{json, Value};

/// Envelope version written by the legacy store today.
pub const CURRENT_VERSION: u64 = 2;

/// A stateless, pure transformation lifting a stored document from one schema
/// generation to the next.
///
/// Upcasters are plain structs with function pointers and are chained
/// automatically (v1 -> v2 -> v3) by [`upcast`].
pub struct SchemaUpcaster {
    pub from_version: u64,
    pub to_version: u64,
    pub transform: fn(Value) -> Value,
}

/// Generation 1 is a bare array of records. Its save time was never recorded.
fn v1_to_v2(slots: Value) -> Value {
    json!({
        "version": 2,
        "updatedAt": 0,
        "slots": slots,
    })
}

pub const UPCASTERS: &[SchemaUpcaster] = &[SchemaUpcaster {
    from_version: 1,
    to_version: 2,
    transform: v1_to_v2,
}];

/// Schema generation of a parsed legacy document, if it is recognizable.
///
/// A bare array is generation 1; an object with a `slots` array is whatever
/// its `version` says, or the current generation when untagged.
pub fn detect_version(document: &Value) -> Option<u64> {
    match document {
        Value::Array(_) => Some(1),
        Value::Object(object) if object.get("slots").is_some_and(Value::is_array) => Some(
            object
                .get("version")
                .and_then(Value::as_u64)
                .unwrap_or(CURRENT_VERSION),
        ),
        _ => None,
    }
}

/// Apply upcasters until none matches. Returns the document and its final version.
pub fn upcast(mut document: Value, mut version: u64, upcasters: &[SchemaUpcaster]) -> (Value, u64) {
    loop {
        let Some(step) = upcasters.iter().find(|u| u.from_version == version) else {
            break;
        };
        document = (step.transform)(document);
        version = step.to_version;
    }
    (document, version)
}

/// Lift any recognizable legacy document to the current envelope and return
/// its `slots`. `None` when the layout is unknown or cannot reach the current
/// generation.
pub fn current_slots(document: Value) -> Option<Vec<Value>> {
    let version = detect_version(&document)?;
    let (mut envelope, version) = upcast(document, version, UPCASTERS);
    if version != CURRENT_VERSION {
        return None;
    }
    match envelope.get_mut("slots").map(Value::take) {
        Some(Value::Array(slots)) => Some(slots),
        _ => None,
    }
}
