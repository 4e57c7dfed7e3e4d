//! Grammar dialects ("providers") understood by the pipeline.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::VizbedError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provider {
    /// Signal-driven imperative grammar.
    Vega,
    /// Declarative encoding grammar.
    VegaLite,
}

impl Provider {
    /// Best-effort detection from a parsed spec's `$schema` URL. The
    /// vega-lite check runs first because its URL contains "vega" too.
    pub fn from_spec(spec: &Value) -> Option<Self> {
        let schema = spec.get("$schema")?.as_str()?;
        if schema.contains("vega-lite") {
            Some(Self::VegaLite)
        } else if schema.contains("vega") {
            Some(Self::Vega)
        } else {
            None
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vega => write!(f, "vega"),
            Self::VegaLite => write!(f, "vegaLite"),
        }
    }
}

impl FromStr for Provider {
    type Err = VizbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vega" => Ok(Self::Vega),
            "vegaLite" | "vega-lite" => Ok(Self::VegaLite),
            other => Err(VizbedError::validation(format!(
                "unknown provider '{other}' (expected 'vega' or 'vegaLite')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sniffs_vega_lite_before_vega() {
        let spec = json!({"$schema": "https://vega.github.io/schema/vega-lite/v5.json"});
        assert_eq!(Provider::from_spec(&spec), Some(Provider::VegaLite));

        let spec = json!({"$schema": "https://vega.github.io/schema/vega/v5.json"});
        assert_eq!(Provider::from_spec(&spec), Some(Provider::Vega));
    }

    #[test]
    fn unknown_or_missing_schema_detects_nothing() {
        assert_eq!(Provider::from_spec(&json!({})), None);
        assert_eq!(
            Provider::from_spec(&json!({"$schema": "https://example.com/other.json"})),
            None
        );
    }

    #[test]
    fn parses_both_spellings() {
        assert_eq!("vega".parse::<Provider>().unwrap(), Provider::Vega);
        assert_eq!("vegaLite".parse::<Provider>().unwrap(), Provider::VegaLite);
        assert_eq!("vega-lite".parse::<Provider>().unwrap(), Provider::VegaLite);
        assert!("d3".parse::<Provider>().is_err());
    }
}
