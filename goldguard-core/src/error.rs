//! Error types for the evaluation pipeline.
//!
//! Each failure class gets its own enum so callers can match on what actually
//! went wrong: configuration problems abort loading, a missing required plugin
//! aborts the current test call, and any metric or provider failure aborts the
//! enclosing evaluation without producing a partial verdict.

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::PluginKind;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A metric specifier string did not match `<name><op><value>`.
    #[error("invalid metric specifier '{0}'")]
    InvalidMetricSpec(String),

    /// A config file had an extension no parser is registered for.
    #[error("unsupported config format '{0}' (expected .json, .yaml, or .yml)")]
    UnsupportedFormat(String),

    /// A plugin was registered under a malformed name.
    #[error("invalid {kind} name '{name}': names are non-empty [a-z0-9_-]")]
    InvalidPluginName { kind: PluginKind, name: String },

    /// An environment override could not be parsed.
    #[error("invalid value '{value}' for {var}")]
    InvalidEnvVar { var: String, value: String },

    /// A config file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file could not be parsed.
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// A required plugin name had no binding in the registry.
#[derive(Debug, Error)]
#[error("no {kind} named '{name}' is registered")]
pub struct ComponentNotFound {
    pub kind: PluginKind,
    pub name: String,
}

/// Errors raised by snapshot store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// An existing record was present but unreadable.
    #[error("corrupt snapshot at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Errors raised by provider backends.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not implement the requested capability.
    #[error("provider '{provider}' does not support {capability}")]
    Unsupported { provider: String, capability: String },

    /// The request to the backend failed.
    #[error("request to '{provider}' failed: {message}")]
    Request { provider: String, message: String },

    /// The backend answered with something unusable.
    #[error("unexpected response from '{provider}': {message}")]
    Response { provider: String, message: String },
}

/// Errors raised while initializing or running a metric.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The rubric document could not be read.
    #[error("failed to read rubric {path}")]
    Rubric {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An embedding call returned the wrong number of vectors.
    #[error("expected 2 embeddings, got {got}")]
    EmbeddingCount { got: usize },

    /// The judge critique had no `Overall Score:` line to extract.
    #[error("judge output has no 'Overall Score:' line")]
    JudgeFormat,

    /// A provider the metric depends on is not registered.
    #[error(transparent)]
    Component(#[from] ComponentNotFound),

    /// The underlying generation/embedding call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Top-level error for `Runner` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or interpreted.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required store or provider is missing from the registry.
    #[error(transparent)]
    NotFound(#[from] ComponentNotFound),

    /// A metric failed to initialize or score.
    #[error("metric '{metric}' failed: {source}")]
    Scoring {
        metric: String,
        #[source]
        source: ScoringError,
    },

    /// The snapshot store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Call arguments could not be serialized into a fingerprint.
    #[error("failed to fingerprint call arguments: {0}")]
    Fingerprint(#[from] serde_json::Error),

    /// The guarded function itself failed.
    #[error("guarded function failed: {0}")]
    Target(#[source] Box<dyn std::error::Error + Send + Sync>),
}
