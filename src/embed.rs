//! Assembly of the options object handed to the rendering engine's
//! mount call.

use serde_json::{Map, Value, json};

use crate::merge::merge_values;

/// Renderer backend every hosted view uses.
pub const DEFAULT_RENDERER: &str = "canvas";

/// Default engine log level (0 = none .. 4 = debug).
pub const DEFAULT_LOG_LEVEL: u8 = 2;

fn engine_defaults() -> Value {
    json!({
        "actions": false,
        "renderer": DEFAULT_RENDERER,
        "logLevel": DEFAULT_LOG_LEVEL,
    })
}

/// Merge engine defaults, the optional patched config, and caller
/// overrides; later layers win on collision. The `config` key appears
/// only when a config object is actually provided — never as an empty
/// placeholder.
pub fn build_embed_options(
    config: Option<&Value>,
    overrides: Option<&Map<String, Value>>,
) -> Value {
    let mut options = engine_defaults();
    if let (Some(config), Some(obj)) = (config, options.as_object_mut()) {
        obj.insert("config".to_string(), config.clone());
    }
    match overrides {
        Some(overrides) => merge_values(&options, &Value::Object(overrides.clone())),
        None => options,
    }
}
