//! Small structural merge over JSON values with explicit precedence.

use serde_json::{Map, Value};

use crate::error::{VizbedError, VizbedResult};

/// Merge `overlay` onto `base`: objects merge key-by-key recursively; on
/// any other collision (scalars, arrays, mixed kinds) the overlay wins.
/// Arrays are never concatenated here — call sites that append to lists
/// (signals, params) do so explicitly with list semantics of their own.
pub fn merge_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(a), Value::Object(b)) => {
            let mut out: Map<String, Value> = a.clone();
            for (key, overlay_value) in b {
                let merged = match out.get(key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        _ => overlay.clone(),
    }
}

/// Clone the root object of a specification-like value.
pub(crate) fn clone_object(value: &Value) -> VizbedResult<Map<String, Value>> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| VizbedError::validation("specification root must be a JSON object"))
}
