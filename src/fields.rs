//! Field-usage tracking across specification edits.
//!
//! Recomputed wholesale whenever the spec or the dataset changes.
//! Entries for fields that left the dataset but are still referenced in
//! the spec are carried over so the host can offer a remap workflow
//! instead of silently breaking encodings.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::migration;

/// Dataset column/measure metadata as captured in templates.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub key: String,
    pub name: String,
    pub kind: FieldKind,
    #[serde(rename = "type")]
    pub data_type: FieldDataType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Column,
    Measure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldDataType {
    Numeric,
    Integer,
    Text,
    Bool,
    DateTime,
    Other,
}

/// One tracked field: where it occurs in the spec and how it relates to
/// the current dataset. `template_metadata_original` keeps the metadata
/// the field had when first tracked, surviving renames in between.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFieldEntry {
    pub placeholder: String,
    pub paths: Vec<String>,
    pub is_in_dataset: bool,
    pub is_in_specification: bool,
    pub is_mapping_required: bool,
    pub template_metadata: FieldMetadata,
    pub template_metadata_original: FieldMetadata,
}

/// Recompute tracking for the current dataset against the current spec.
/// Previous entries whose key left the dataset are retained while the
/// spec still references them, flagged as requiring a remap.
pub fn track_fields(
    spec: &Value,
    dataset_fields: &[FieldMetadata],
    previous: &[TrackedFieldEntry],
) -> Vec<TrackedFieldEntry> {
    let mut entries = Vec::new();
    let mut current_keys = BTreeSet::new();

    for (index, field) in dataset_fields.iter().enumerate() {
        let paths = occurrence_paths(spec, &field.name);
        let original = previous
            .iter()
            .find(|entry| entry.template_metadata.key == field.key)
            .map(|entry| entry.template_metadata_original.clone())
            .unwrap_or_else(|| field.clone());
        current_keys.insert(field.key.clone());
        entries.push(TrackedFieldEntry {
            placeholder: format!("__{index}__"),
            is_in_dataset: true,
            is_in_specification: !paths.is_empty(),
            is_mapping_required: false,
            paths,
            template_metadata: field.clone(),
            template_metadata_original: original,
        });
    }

    for entry in previous {
        if current_keys.contains(&entry.template_metadata.key) {
            continue;
        }
        let paths = occurrence_paths(spec, &entry.template_metadata.name);
        if paths.is_empty() {
            continue;
        }
        entries.push(TrackedFieldEntry {
            placeholder: entry.placeholder.clone(),
            paths,
            is_in_dataset: false,
            is_in_specification: true,
            is_mapping_required: true,
            template_metadata: entry.template_metadata.clone(),
            template_metadata_original: entry.template_metadata_original.clone(),
        });
    }

    entries
}

/// JSON paths (dotted keys, `[i]` array segments) of every string leaf
/// in the spec that names the field: an exact match, or a whole-word
/// occurrence inside a longer expression string.
pub fn occurrence_paths(spec: &Value, field_name: &str) -> Vec<String> {
    let mut paths = Vec::new();
    walk(spec, field_name, String::new(), &mut paths);
    paths
}

fn walk(value: &Value, field_name: &str, path: String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, field_name, child_path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, field_name, format!("{path}[{index}]"), out);
            }
        }
        Value::String(s) => {
            if s == field_name || migration::contains_word(s, field_name) {
                out.push(path);
            }
        }
        _ => {}
    }
}
