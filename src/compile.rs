//! Compilation orchestrator: migrate → parse → patch → validate.
//!
//! A straight-line pipeline with early return on the first fatal error.
//! Warnings accumulate across stages and are returned even alongside a
//! terminal error, so a host can show what is wrong and what is merely
//! suspicious at the same time.

use serde_json::{Map, Value};

use crate::{
    config_patch::patch_config,
    embed::{DEFAULT_LOG_LEVEL, build_embed_options},
    jsonc,
    merge::merge_values,
    migration::{self, CONTAINER_SIGNAL_NAME},
    provider::Provider,
    spec_patch::{ContainerDimensions, patch_spec},
};

/// Fixed default config text used when the caller supplies none.
pub const DEFAULT_CONFIG: &str = "{}";

pub const SPEC_PARSE_ERROR_PREFIX: &str = "Specification JSON parse error:";
pub const CONFIG_PARSE_ERROR_PREFIX: &str = "Config JSON parse error:";

/// Verdict of a schema-conformance pass. Findings here are advisory:
/// the orchestrator downgrades everything to warnings.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SchemaValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
}

/// Schema-conformance capability, injected per request. Alternate
/// strategies (published-schema-backed, heuristic) are interchangeable.
pub trait SchemaValidator {
    fn validate(&self, unit: &Value) -> SchemaValidation;
}

/// The grammar's own compiler/parser, used to catch semantic errors
/// schema validation cannot. An implementation typically wraps the
/// external rendering engine's parse entry point; it is expected to be
/// lenient about forward references (e.g. dangling scale references)
/// and fail only on genuine compile errors.
pub trait GrammarCompiler {
    fn compile(&self, provider: Provider, unit: &Value) -> Result<(), String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileStatus {
    Ready,
    Error,
}

/// Terminal result of a compile call. Constructed once per call and
/// never mutated afterwards; `embed_options` is populated only on the
/// ready path.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutcome {
    pub status: CompileStatus,
    pub parsed_spec: Option<Value>,
    pub config: Option<Value>,
    pub embed_options: Value,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CompileOutcome {
    pub fn is_ready(&self) -> bool {
        self.status == CompileStatus::Ready
    }

    fn failure(errors: Vec<String>, config: Option<Value>, warnings: Vec<String>) -> Self {
        Self {
            status: CompileStatus::Error,
            parsed_spec: None,
            config,
            embed_options: Value::Object(Map::new()),
            errors,
            warnings,
        }
    }
}

/// Errors and warnings only, for fast validation feedback while the
/// user types.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// One compile call's worth of inputs. Everything beyond the spec text
/// and the provider is optional; capabilities (schema validator,
/// grammar compiler) are injected per request rather than held as
/// ambient state.
pub struct CompileRequest<'a> {
    spec: &'a str,
    config: Option<&'a str>,
    provider: Provider,
    validator: Option<&'a dyn SchemaValidator>,
    compiler: Option<&'a dyn GrammarCompiler>,
    container: Option<ContainerDimensions>,
    extra_signals: Vec<Value>,
    embed_overrides: Option<Map<String, Value>>,
    log_level: u8,
}

impl<'a> CompileRequest<'a> {
    pub fn new(spec: &'a str, provider: Provider) -> Self {
        Self {
            spec,
            config: None,
            provider,
            validator: None,
            compiler: None,
            container: None,
            extra_signals: Vec::new(),
            embed_overrides: None,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    pub fn config(mut self, config: &'a str) -> Self {
        self.config = Some(config);
        self
    }

    pub fn container(mut self, dimensions: ContainerDimensions) -> Self {
        self.container = Some(dimensions);
        self
    }

    pub fn validator(mut self, validator: &'a dyn SchemaValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn compiler(mut self, compiler: &'a dyn GrammarCompiler) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Extra signals (Vega) or parameters (Vega-Lite) appended after
    /// the injected container entry.
    pub fn extra_signals(mut self, signals: Vec<Value>) -> Self {
        self.extra_signals = signals;
        self
    }

    pub fn embed_options(mut self, overrides: Map<String, Value>) -> Self {
        self.embed_overrides = Some(overrides);
        self
    }

    /// Verbosity for advisory log emission, 0 (silent) to 4 (debug).
    pub fn log_level(mut self, level: u8) -> Self {
        self.log_level = level.min(4);
        self
    }
}

/// Run the full pipeline and produce render-ready output: the patched
/// spec, the patched config, and the embed options.
#[tracing::instrument(skip_all, fields(provider = %request.provider))]
pub fn compile(request: &CompileRequest<'_>) -> CompileOutcome {
    run(request, true)
}

/// Validation-only sibling of [`compile`]: same pipeline, result
/// reduced to errors and warnings. Unlike the compile path it never
/// emits the legacy-reference log line (it runs on every keystroke).
pub fn lint(request: &CompileRequest<'_>) -> LintReport {
    let outcome = run(request, false);
    LintReport {
        errors: outcome.errors,
        warnings: outcome.warnings,
    }
}

fn run(request: &CompileRequest<'_>, emit_legacy_log: bool) -> CompileOutcome {
    let mut warnings = Vec::new();

    // Migration first: it works on raw text and must precede parsing.
    let migration = migration::migrate_legacy_references(request.spec);
    if migration.had_legacy_references {
        if emit_legacy_log && request.log_level > 0 {
            tracing::warn!(
                replacements = migration.replacement_count,
                "legacy container references migrated"
            );
        }
        warnings.push(format!(
            "replaced {} legacy container reference(s) with `{CONTAINER_SIGNAL_NAME}`; \
             update the specification to silence this warning",
            migration.replacement_count
        ));
    }

    // Either side failing to parse is terminal; the other side's
    // partial result is discarded rather than returned half-filled.
    let spec_parse = jsonc::parse(&migration.spec);
    let Some(spec_value) = spec_parse.result else {
        return CompileOutcome::failure(
            prefix_errors(SPEC_PARSE_ERROR_PREFIX, spec_parse.errors),
            None,
            warnings,
        );
    };

    let config_patch = patch_config(Some(request.config.unwrap_or(DEFAULT_CONFIG)));
    let Some(config_value) = config_patch.result else {
        return CompileOutcome::failure(
            prefix_errors(CONFIG_PARSE_ERROR_PREFIX, config_patch.errors),
            None,
            warnings,
        );
    };

    let patched_spec = match patch_spec(
        request.provider,
        &spec_value,
        request.container.as_ref(),
        &request.extra_signals,
    ) {
        Ok(spec) => spec,
        Err(e) => {
            return CompileOutcome::failure(vec![e.to_string()], Some(config_value), warnings);
        }
    };

    let unit = validation_unit(&patched_spec, &config_value);

    if let Some(validator) = request.validator {
        let verdict = validator.validate(&unit);
        if !verdict.valid && verdict.warnings.is_empty() {
            warnings.push("specification does not conform to the published schema".to_string());
        }
        warnings.extend(verdict.warnings);
    }

    if let Some(compiler) = request.compiler {
        if let Err(message) = compiler.compile(request.provider, &unit) {
            return CompileOutcome::failure(
                vec![jsonc::redact_spec_echo(&message)],
                Some(config_value),
                warnings,
            );
        }
    }

    let embed_options = build_embed_options(Some(&config_value), request.embed_overrides.as_ref());
    CompileOutcome {
        status: CompileStatus::Ready,
        parsed_spec: Some(patched_spec),
        config: Some(config_value),
        embed_options,
        errors: Vec::new(),
        warnings,
    }
}

/// The complete unit handed to the validator and the grammar compiler:
/// the patched spec with the patched config folded in under `config`.
/// A config object inlined in the spec wins over the external one.
fn validation_unit(patched_spec: &Value, config: &Value) -> Value {
    let mut unit = patched_spec.clone();
    let merged_config = match unit.get("config") {
        Some(inline) => merge_values(config, inline),
        None => config.clone(),
    };
    if let Some(obj) = unit.as_object_mut() {
        obj.insert("config".to_string(), merged_config);
    }
    unit
}

fn prefix_errors(prefix: &str, errors: Vec<String>) -> Vec<String> {
    errors
        .into_iter()
        .map(|error| format!("{prefix} {error}"))
        .collect()
}
