//! Container-awareness patches applied to parsed specifications.
//!
//! Both grammar variants append a signal/parameter named
//! [`CONTAINER_SIGNAL_NAME`](crate::migration::CONTAINER_SIGNAL_NAME)
//! carrying the host element's metrics, then wire up responsive sizing
//! where the grammar and the user's own spec allow it. Every patch is a
//! pure `(spec, options) -> new spec` transform; inputs are never
//! mutated.

use serde_json::{Map, Value, json};

use crate::error::{VizbedError, VizbedResult};
use crate::merge::clone_object;
use crate::migration::CONTAINER_SIGNAL_NAME;
use crate::provider::Provider;

/// Width/height of the hosting element as supplied by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContainerDimensions {
    pub width: f64,
    pub height: f64,
}

/// Scroll-aware variant embedded as the container signal's value.
/// Fields the caller does not supply stay zero — `null`/absent never
/// propagates past this boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerMetrics {
    pub height: f64,
    pub width: f64,
    pub scroll_height: f64,
    pub scroll_width: f64,
    pub scroll_top: f64,
    pub scroll_left: f64,
}

impl From<ContainerDimensions> for ContainerMetrics {
    fn from(dims: ContainerDimensions) -> Self {
        Self {
            height: dims.height,
            width: dims.width,
            ..Self::default()
        }
    }
}

/// The signal/parameter entry injected into every patched spec.
fn container_entry(dimensions: Option<&ContainerDimensions>) -> Value {
    let metrics = dimensions
        .copied()
        .map(ContainerMetrics::from)
        .unwrap_or_default();
    json!({
        "name": CONTAINER_SIGNAL_NAME,
        "value": metrics,
    })
}

/// Apply the grammar-appropriate container patch. `extras` are
/// caller-supplied signals (Vega) or parameters (Vega-Lite) appended
/// after the container entry.
pub fn patch_spec(
    provider: Provider,
    spec: &Value,
    dimensions: Option<&ContainerDimensions>,
    extras: &[Value],
) -> VizbedResult<Value> {
    match provider {
        Provider::Vega => patch_vega_spec(spec, dimensions, extras),
        Provider::VegaLite => patch_vega_lite_spec(spec, dimensions, extras),
    }
}

/// Patch a Vega specification: append the container signal (plus caller
/// extras) to `signals`, and point top-level `width`/`height` at the
/// container signal unless the user already sized the view — via an
/// explicit top-level key, or via a signal of their own named `width`
/// or `height` (which would clash with injected sizing expressions).
pub fn patch_vega_spec(
    spec: &Value,
    dimensions: Option<&ContainerDimensions>,
    extra_signals: &[Value],
) -> VizbedResult<Value> {
    let mut out = clone_object(spec)?;

    let mut signals = match out.get("signals") {
        Some(Value::Array(existing)) => existing.clone(),
        Some(_) => {
            return Err(VizbedError::validation(
                "top-level `signals` must be an array",
            ));
        }
        None => Vec::new(),
    };
    let user_signal_names: Vec<String> = signals
        .iter()
        .filter_map(|signal| signal.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    signals.push(container_entry(dimensions));
    signals.extend(extra_signals.iter().cloned());
    out.insert("signals".to_string(), Value::Array(signals));

    if dimensions.is_some() {
        for axis in ["width", "height"] {
            if out.contains_key(axis) {
                continue;
            }
            if user_signal_names.iter().any(|name| name == axis) {
                continue;
            }
            out.insert(
                axis.to_string(),
                json!({ "signal": format!("{CONTAINER_SIGNAL_NAME}.{axis}") }),
            );
        }
    }

    Ok(Value::Object(out))
}

/// Top-level keywords marking a composite multi-view layout, which does
/// not support top-level `"container"` sizing.
const COMPOSITE_LAYOUT_KEYS: [&str; 4] = ["hconcat", "vconcat", "concat", "facet"];

fn has_composite_layout(spec: &Map<String, Value>) -> bool {
    COMPOSITE_LAYOUT_KEYS.iter().any(|key| spec.contains_key(*key))
}

/// Patch a Vega-Lite specification: append the container parameter
/// (plus caller extras) to `params`. Single-view, layered and repeated
/// layouts additionally get `"container"` sizing where the user has not
/// set `width`/`height` themselves; composite layouts get the parameter
/// only.
pub fn patch_vega_lite_spec(
    spec: &Value,
    dimensions: Option<&ContainerDimensions>,
    extra_params: &[Value],
) -> VizbedResult<Value> {
    let mut out = clone_object(spec)?;

    let mut params = match out.get("params") {
        Some(Value::Array(existing)) => existing.clone(),
        Some(_) => {
            return Err(VizbedError::validation(
                "top-level `params` must be an array",
            ));
        }
        None => Vec::new(),
    };
    params.push(container_entry(dimensions));
    params.extend(extra_params.iter().cloned());
    out.insert("params".to_string(), Value::Array(params));

    if !has_composite_layout(&out) {
        for axis in ["width", "height"] {
            if !out.contains_key(axis) {
                out.insert(axis.to_string(), Value::String("container".to_string()));
            }
        }
    }

    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dims(width: f64, height: f64) -> ContainerDimensions {
        ContainerDimensions { width, height }
    }

    fn container_signal_of(spec: &Value, list: &str) -> Value {
        spec[list]
            .as_array()
            .unwrap()
            .iter()
            .find(|entry| entry["name"] == CONTAINER_SIGNAL_NAME)
            .cloned()
            .unwrap()
    }

    #[test]
    fn vega_appends_container_signal_with_zero_filled_scroll_metrics() {
        let spec = json!({"marks": []});
        let patched = patch_vega_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
        let signal = container_signal_of(&patched, "signals");
        assert_eq!(
            signal["value"],
            json!({
                "height": 600.0, "width": 800.0,
                "scrollHeight": 0.0, "scrollWidth": 0.0,
                "scrollTop": 0.0, "scrollLeft": 0.0
            })
        );
    }

    #[test]
    fn vega_preserves_existing_signals_and_appends_extras_after_container() {
        let spec = json!({"signals": [{"name": "opacity", "value": 0.5}]});
        let extra = json!({"name": "selected", "value": null});
        let patched = patch_vega_spec(&spec, Some(&dims(10.0, 10.0)), &[extra.clone()]).unwrap();
        let signals = patched["signals"].as_array().unwrap();
        assert_eq!(signals.len(), 3);
        assert_eq!(signals[0]["name"], "opacity");
        assert_eq!(signals[1]["name"], CONTAINER_SIGNAL_NAME);
        assert_eq!(signals[2], extra);
    }

    #[test]
    fn vega_sizes_unsized_axes_from_the_container_signal() {
        let spec = json!({"marks": []});
        let patched = patch_vega_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
        assert_eq!(patched["width"], json!({"signal": "vizbedContainer.width"}));
        assert_eq!(patched["height"], json!({"signal": "vizbedContainer.height"}));
    }

    #[test]
    fn vega_explicit_sizing_wins_over_container_dimensions() {
        let spec = json!({"width": 500, "marks": []});
        let patched = patch_vega_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
        assert_eq!(patched["width"], 500);
        assert_eq!(patched["height"], json!({"signal": "vizbedContainer.height"}));
    }

    #[test]
    fn vega_user_width_signal_blocks_injected_sizing() {
        let spec = json!({"signals": [
            {"name": "width", "init": "200", "on": [{"events": "click", "update": "width + 10"}]}
        ]});
        let patched = patch_vega_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
        assert!(patched.get("width").is_none());
        assert_eq!(patched["height"], json!({"signal": "vizbedContainer.height"}));
    }

    #[test]
    fn vega_without_dimensions_gets_signal_but_no_sizing() {
        let spec = json!({"marks": []});
        let patched = patch_vega_spec(&spec, None, &[]).unwrap();
        let signal = container_signal_of(&patched, "signals");
        assert_eq!(signal["value"]["width"], 0.0);
        assert!(patched.get("width").is_none());
        assert!(patched.get("height").is_none());
    }

    #[test]
    fn vega_input_spec_is_not_mutated() {
        let spec = json!({"signals": [{"name": "opacity"}], "marks": []});
        let snapshot = spec.clone();
        let _ = patch_vega_spec(&spec, Some(&dims(1.0, 2.0)), &[]).unwrap();
        assert_eq!(spec, snapshot);
    }

    #[test]
    fn vega_lite_standard_layout_gets_container_sizing() {
        let spec = json!({"mark": "bar", "encoding": {}});
        let patched = patch_vega_lite_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
        assert_eq!(patched["width"], "container");
        assert_eq!(patched["height"], "container");
        let param = container_signal_of(&patched, "params");
        assert_eq!(param["value"]["width"], 800.0);
    }

    #[test]
    fn vega_lite_user_sizing_is_left_alone() {
        let spec = json!({"mark": "bar", "width": 250});
        let patched = patch_vega_lite_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
        assert_eq!(patched["width"], 250);
        assert_eq!(patched["height"], "container");
    }

    #[test]
    fn vega_lite_composite_layouts_get_param_but_no_sizing() {
        for key in ["hconcat", "vconcat", "concat", "facet"] {
            let spec = json!({key: []});
            let patched = patch_vega_lite_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
            assert!(patched.get("width").is_none(), "{key} got width");
            assert!(patched.get("height").is_none(), "{key} got height");
            let param = container_signal_of(&patched, "params");
            assert_eq!(param["name"], CONTAINER_SIGNAL_NAME);
        }
    }

    #[test]
    fn vega_lite_layer_and_repeat_are_standard_layouts() {
        for key in ["layer", "repeat"] {
            let spec = json!({key: []});
            let patched = patch_vega_lite_spec(&spec, Some(&dims(800.0, 600.0)), &[]).unwrap();
            assert_eq!(patched["width"], "container", "{key} missing width");
        }
    }

    #[test]
    fn vega_lite_preserves_existing_params() {
        let spec = json!({"mark": "bar", "params": [{"name": "highlight", "select": "point"}]});
        let patched = patch_vega_lite_spec(&spec, None, &[]).unwrap();
        let params = patched["params"].as_array().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0]["name"], "highlight");
        assert_eq!(params[1]["name"], CONTAINER_SIGNAL_NAME);
    }

    #[test]
    fn non_object_spec_is_rejected() {
        assert!(patch_vega_spec(&json!([1, 2]), None, &[]).is_err());
        assert!(patch_vega_lite_spec(&json!("nope"), None, &[]).is_err());
    }

    #[test]
    fn dispatcher_selects_the_grammar_variant() {
        let spec = json!({"mark": "bar"});
        let patched = patch_spec(Provider::VegaLite, &spec, None, &[]).unwrap();
        assert!(patched.get("params").is_some());

        let spec = json!({"marks": []});
        let patched = patch_spec(Provider::Vega, &spec, None, &[]).unwrap();
        assert!(patched.get("signals").is_some());
    }
}
