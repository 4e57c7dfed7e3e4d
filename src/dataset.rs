//! Live dataset injection into known-valid specifications.

use serde_json::{Value, json};

use crate::error::{VizbedError, VizbedResult};
use crate::merge::clone_object;
use crate::provider::Provider;

/// Name of the data source/dataset entry the host owns.
pub const DEFAULT_DATASET_NAME: &str = "dataset";

/// Inject rows under the host dataset name for the given grammar. The
/// rows are deep-copied on embed, so later mutation of the caller's
/// array (or of the embedded copy) cannot cross-contaminate.
pub fn patch_dataset(provider: Provider, spec: &Value, values: &[Value]) -> VizbedResult<Value> {
    match provider {
        Provider::Vega => patch_vega_data(spec, values),
        Provider::VegaLite => patch_vega_lite_data(spec, values),
    }
}

/// Vega: data sources live in the top-level `data` array. When an entry
/// under the host name exists, only its `values` are replaced — its
/// other properties (transform pipelines, formats) and every sibling
/// entry pass through untouched, order preserved. Otherwise a minimal
/// `{name, values}` entry is appended.
pub fn patch_vega_data(spec: &Value, values: &[Value]) -> VizbedResult<Value> {
    let mut out = clone_object(spec)?;
    let rows = Value::Array(values.to_vec());

    let mut data = match out.get("data") {
        Some(Value::Array(existing)) => existing.clone(),
        Some(_) => {
            return Err(VizbedError::validation("top-level `data` must be an array"));
        }
        None => Vec::new(),
    };

    let existing = data.iter_mut().find(|entry| {
        entry.get("name").and_then(Value::as_str) == Some(DEFAULT_DATASET_NAME)
    });
    match existing {
        Some(entry) => {
            if let Some(entry) = entry.as_object_mut() {
                entry.insert("values".to_string(), rows);
            }
        }
        None => data.push(json!({ "name": DEFAULT_DATASET_NAME, "values": rows })),
    }

    out.insert("data".to_string(), Value::Array(data));
    Ok(Value::Object(out))
}

/// Vega-Lite: values live in the flat `datasets` name→rows map. The
/// host entry is set/replaced; sibling entries are preserved.
pub fn patch_vega_lite_data(spec: &Value, values: &[Value]) -> VizbedResult<Value> {
    let mut out = clone_object(spec)?;

    let mut datasets = match out.get("datasets") {
        Some(Value::Object(existing)) => existing.clone(),
        Some(_) => {
            return Err(VizbedError::validation(
                "top-level `datasets` must be an object",
            ));
        }
        None => serde_json::Map::new(),
    };
    datasets.insert(
        DEFAULT_DATASET_NAME.to_string(),
        Value::Array(values.to_vec()),
    );

    out.insert("datasets".to_string(), Value::Object(datasets));
    Ok(Value::Object(out))
}
