//! Host defaults and conflict cleanup for user-supplied config.

use serde_json::{Map, Value, json};

use crate::jsonc::{self, ParseOutcome};
use crate::merge::merge_values;

/// Defaults merged underneath the user's config; the user's own values
/// win on collision.
fn host_defaults() -> Value {
    json!({
        "background": "transparent",
        "customFormatTypes": true,
    })
}

/// Parse raw config JSONC and patch the result. Parse errors pass
/// through unchanged. Settings that would fight the responsive-sizing
/// patches applied to the specification are removed or neutralized
/// after the defaults merge.
pub fn patch_config(text: Option<&str>) -> ParseOutcome {
    let mut parsed = jsonc::parse_opt(text);
    if let Some(value) = parsed.result.take() {
        parsed.result = Some(apply(value));
    }
    parsed
}

fn apply(user: Value) -> Value {
    if !user.is_object() {
        return user;
    }
    let mut merged = merge_values(&host_defaults(), &user);
    if let Some(config) = merged.as_object_mut() {
        strip_container_sizing(config);
        disable_autosize_resize(config);
    }
    merged
}

/// `width`/`height: "container"` belongs in the spec, where the sizing
/// patch manages it; in the config it conflicts with that patch.
fn strip_container_sizing(config: &mut Map<String, Value>) {
    for key in ["width", "height"] {
        if config.get(key).and_then(Value::as_str) == Some("container") {
            config.remove(key);
        }
    }
}

/// `autosize.resize: true` re-triggers layout on every datum change and
/// conflicts with host-driven resize; everything else on `autosize`
/// (including an explicit `null`) passes through.
fn disable_autosize_resize(config: &mut Map<String, Value>) {
    if let Some(Value::Object(autosize)) = config.get_mut("autosize") {
        if autosize.get("resize").and_then(Value::as_bool) == Some(true) {
            autosize.insert("resize".to_string(), Value::Bool(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_fill_in_under_an_empty_config() {
        let outcome = patch_config(Some("{}"));
        assert_eq!(
            outcome.result,
            Some(json!({"background": "transparent", "customFormatTypes": true}))
        );
    }

    #[test]
    fn user_values_win_over_defaults() {
        let outcome = patch_config(Some(r##"{"background": "#ffffff"}"##));
        let config = outcome.result.unwrap();
        assert_eq!(config["background"], "#ffffff");
        assert_eq!(config["customFormatTypes"], true);
    }

    #[test]
    fn none_behaves_like_empty_config() {
        let outcome = patch_config(None);
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.result.unwrap()["background"],
            json!("transparent")
        );
    }

    #[test]
    fn container_sizing_keys_are_removed() {
        let outcome =
            patch_config(Some(r#"{"width": "container", "height": "container"}"#));
        let config = outcome.result.unwrap();
        assert!(config.get("width").is_none());
        assert!(config.get("height").is_none());
    }

    #[test]
    fn numeric_sizing_keys_are_preserved() {
        let outcome = patch_config(Some(r#"{"width": 400}"#));
        assert_eq!(outcome.result.unwrap()["width"], 400);
    }

    #[test]
    fn autosize_resize_is_forced_off() {
        let outcome =
            patch_config(Some(r#"{"autosize": {"resize": true, "type": "fit"}}"#));
        let config = outcome.result.unwrap();
        assert_eq!(config["autosize"], json!({"resize": false, "type": "fit"}));
    }

    #[test]
    fn autosize_without_resize_passes_through() {
        let outcome = patch_config(Some(r#"{"autosize": {"type": "pad"}}"#));
        assert_eq!(outcome.result.unwrap()["autosize"], json!({"type": "pad"}));
    }

    #[test]
    fn null_autosize_is_preserved() {
        let outcome = patch_config(Some(r#"{"autosize": null}"#));
        assert_eq!(outcome.result.unwrap()["autosize"], Value::Null);
    }

    #[test]
    fn parse_errors_pass_through() {
        let outcome = patch_config(Some("{broken"));
        assert!(outcome.result.is_none());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn config_comments_are_tolerated() {
        let outcome = patch_config(Some("{\n  // host theme\n  \"background\": \"black\"\n}"));
        assert_eq!(outcome.result.unwrap()["background"], "black");
    }
}
