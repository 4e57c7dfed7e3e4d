#![forbid(unsafe_code)]

pub mod compile;
pub mod config_patch;
pub mod dataset;
pub mod embed;
pub mod error;
pub mod fields;
pub mod jsonc;
pub mod merge;
pub mod migration;
pub mod provider;
pub mod spec_patch;

pub use compile::{
    CompileOutcome, CompileRequest, CompileStatus, DEFAULT_CONFIG, GrammarCompiler, LintReport,
    SchemaValidation, SchemaValidator, compile, lint,
};
pub use config_patch::patch_config;
pub use dataset::{DEFAULT_DATASET_NAME, patch_dataset};
pub use embed::build_embed_options;
pub use error::{VizbedError, VizbedResult};
pub use fields::{FieldDataType, FieldKind, FieldMetadata, TrackedFieldEntry, track_fields};
pub use jsonc::ParseOutcome;
pub use migration::{
    CONTAINER_SIGNAL_NAME, MigrationOutcome, has_legacy_references, migrate_legacy_references,
};
pub use provider::Provider;
pub use spec_patch::{ContainerDimensions, ContainerMetrics, patch_spec};
