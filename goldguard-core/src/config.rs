//! Configuration types and the merge pipeline.
//!
//! Configuration flows through four layers, later layers winning:
//! built-in defaults < config file < environment < runtime overrides.
//! Files are YAML or JSON; [`ConfigLoader`] discovers the first match from
//! [`ConfigLoader::DISCOVERY`] or loads an explicit path. The merged result is
//! a [`CoreConfig`], consumed by a `Runner` together with the per-guard
//! [`GuardConfig`] attached at wrap time.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::threshold::MetricSpec;

/// Per-metric tuning knobs, all optional so layers can merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOptions {
    /// Whether the metric participates at all.
    pub enabled: Option<bool>,
    /// Minimum passing score (inclusive).
    pub min: Option<f64>,
    /// Maximum passing score (inclusive).
    pub max: Option<f64>,
    /// Relative weight, reserved for the `average` fail-policy.
    pub weight: Option<f64>,
    /// Whether this metric must pass under the `must-pass` fail-policy.
    pub must_pass: Option<bool>,
    /// Provider name the metric should resolve, overriding its default.
    pub provider: Option<String>,
    /// Model name the metric should request.
    pub model: Option<String>,
    /// Path to the rubric document (judge metric).
    pub rubric_file: Option<PathBuf>,
}

impl MetricOptions {
    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn overlay(&self, other: &MetricOptions) -> MetricOptions {
        MetricOptions {
            enabled: other.enabled.or(self.enabled),
            min: other.min.or(self.min),
            max: other.max.or(self.max),
            weight: other.weight.or(self.weight),
            must_pass: other.must_pass.or(self.must_pass),
            provider: other.provider.clone().or_else(|| self.provider.clone()),
            model: other.model.clone().or_else(|| self.model.clone()),
            rubric_file: other
                .rubric_file
                .clone()
                .or_else(|| self.rubric_file.clone()),
        }
    }
}

/// The metrics a guard requests: specifier strings or a per-metric option map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricSet {
    /// Specifier strings like `"exact"` or `"semantic>=0.92"`.
    Specs(Vec<String>),
    /// Explicit per-metric options, keyed by metric name.
    Options(BTreeMap<String, MetricOptions>),
}

impl MetricSet {
    pub fn is_empty(&self) -> bool {
        match self {
            MetricSet::Specs(specs) => specs.is_empty(),
            MetricSet::Options(map) => map.is_empty(),
        }
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        MetricSet::Specs(Vec::new())
    }
}

/// Evaluation metadata attached to a wrapped function.
///
/// Immutable once attached; the `Runner` reads it through the guard's side
/// channel. Anything left unset falls back to the [`CoreConfig`] defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Stable identifier the snapshot is keyed under.
    pub id: String,
    /// Metrics to score with; empty means the configured defaults.
    pub metrics: MetricSet,
    /// Snapshot store backend name override.
    pub store: Option<String>,
    /// Provider name override.
    pub provider: Option<String>,
    /// Model name override.
    pub model: Option<String>,
    /// Model the judge metric should use for this guard.
    pub judge_model: Option<String>,
    /// Sampling temperature override.
    pub temperature: Option<f64>,
    /// Parallelism hint for an external suite scheduler.
    pub concurrency: Option<usize>,
}

impl GuardConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metrics: MetricSet::default(),
            store: None,
            provider: None,
            model: None,
            judge_model: None,
            temperature: None,
            concurrency: None,
        }
    }

    /// Set the metric list from specifier strings.
    pub fn metrics<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = MetricSet::Specs(specs.into_iter().map(Into::into).collect());
        self
    }

    /// Add one metric with explicit options (switches the set to map form).
    pub fn metric(mut self, name: impl Into<String>, options: MetricOptions) -> Self {
        let mut map = match self.metrics {
            MetricSet::Options(map) => map,
            MetricSet::Specs(_) => BTreeMap::new(),
        };
        map.insert(name.into(), options);
        self.metrics = MetricSet::Options(map);
        self
    }

    pub fn store(mut self, name: impl Into<String>) -> Self {
        self.store = Some(name.into());
        self
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }

    pub fn model(mut self, name: impl Into<String>) -> Self {
        self.model = Some(name.into());
        self
    }

    pub fn judge_model(mut self, name: impl Into<String>) -> Self {
        self.judge_model = Some(name.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Rule reducing per-metric outcomes to one overall verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailPolicy {
    /// Pass iff every metric flagged `must_pass` passes; others may fail.
    #[default]
    MustPass,
    /// Pass iff every scored metric passes. The name is historical and reads
    /// as the opposite of what it does; the behavior is kept for config
    /// compatibility.
    Any,
    /// Reserved for weighted comparison against a baseline; currently always
    /// passes.
    Average,
}

impl fmt::Display for FailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailPolicy::MustPass => "must-pass",
            FailPolicy::Any => "any",
            FailPolicy::Average => "average",
        };
        write!(f, "{name}")
    }
}

/// Fallbacks applied when a guard leaves a knob unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    /// Metric specifier strings used when a guard names none.
    pub metrics: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.0,
            metrics: vec!["exact".to_string(), "semantic>=0.92".to_string()],
        }
    }
}

/// Where snapshots live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotsConfig {
    /// Registered store backend name.
    pub backend: String,
    /// Base directory for file-backed stores.
    pub dir: PathBuf,
}

impl Default for SnapshotsConfig {
    fn default() -> Self {
        Self {
            backend: "yaml".to_string(),
            dir: PathBuf::from(".goldguard/snapshots"),
        }
    }
}

/// The fully merged configuration a `Runner` operates under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub defaults: DefaultsConfig,
    /// Baseline per-metric options, merged under guard-level overrides.
    pub metrics: BTreeMap<String, MetricOptions>,
    pub snapshots: SnapshotsConfig,
    /// Reporter names, invoked in order.
    pub reporters: Vec<String>,
    /// Spend ceiling carried for external schedulers; not enforced here.
    pub budget_usd: f64,
    /// Parallelism hint for an external suite scheduler; not used internally.
    pub concurrency: usize,
    pub fail_on: FailPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "exact".to_string(),
            MetricOptions {
                enabled: Some(true),
                ..MetricOptions::default()
            },
        );
        metrics.insert(
            "semantic".to_string(),
            MetricOptions {
                provider: Some("hash-embed".to_string()),
                min: Some(0.92),
                ..MetricOptions::default()
            },
        );
        metrics.insert(
            "judge".to_string(),
            MetricOptions {
                enabled: Some(false),
                provider: Some("openai".to_string()),
                model: Some("gpt-4o-mini".to_string()),
                rubric_file: Some(PathBuf::from(".goldguard/rubrics/default.md")),
                min: Some(8.0),
                ..MetricOptions::default()
            },
        );

        Self {
            defaults: DefaultsConfig::default(),
            metrics,
            snapshots: SnapshotsConfig::default(),
            reporters: vec!["console".to_string()],
            budget_usd: 2.0,
            concurrency: 3,
            fail_on: FailPolicy::default(),
        }
    }
}

/// Configuration as read from a file or supplied as runtime overrides:
/// every field optional so layers merge cleanly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub defaults: RawDefaults,
    pub metrics: BTreeMap<String, MetricOptions>,
    pub snapshots: RawSnapshots,
    pub reporters: Option<Vec<String>>,
    pub budget_usd: Option<f64>,
    pub concurrency: Option<usize>,
    pub fail_on: Option<FailPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDefaults {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub metrics: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSnapshots {
    pub backend: Option<String>,
    pub dir: Option<PathBuf>,
}

/// Loads and merges configuration layers.
pub struct ConfigLoader;

impl ConfigLoader {
    /// File names probed, in order, when no explicit path is given.
    pub const DISCOVERY: [&'static str; 5] = [
        ".goldguardrc",
        ".goldguardrc.json",
        ".goldguardrc.yaml",
        ".goldguardrc.yml",
        "goldguard.config.yaml",
    ];

    /// Load merged configuration: discovered file + environment.
    pub fn load() -> Result<CoreConfig, ConfigError> {
        Self::load_with(None, RawConfig::default())
    }

    /// Load merged configuration from an explicit file + environment.
    ///
    /// A missing file is not an error; it logs a warning and falls back to
    /// defaults, matching the behavior of discovery finding nothing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
        Self::load_with(Some(path.as_ref()), RawConfig::default())
    }

    /// Load all four layers: defaults < file < environment < `runtime`.
    pub fn load_with(path: Option<&Path>, runtime: RawConfig) -> Result<CoreConfig, ConfigError> {
        let mut raw = RawConfig::default();

        // Layer 2: config file (explicit path or discovery)
        if let Some(path) = path {
            if path.exists() {
                raw = Self::merge_raw(raw, Self::read_file(path)?);
            } else {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
            }
        } else if let Some(found) = Self::DISCOVERY.iter().map(Path::new).find(|p| p.exists()) {
            raw = Self::merge_raw(raw, Self::read_file(found)?);
        }

        // Layer 3: environment
        raw = Self::apply_budget_env(raw, std::env::var("GOLDGUARD_BUDGET_USD").ok())?;

        // Layer 4: runtime overrides
        raw = Self::merge_raw(raw, runtime);

        Ok(Self::finalize(raw))
    }

    /// Parse one config file by extension (`.json`, `.yaml`/`.yml`; an
    /// extensionless rc file is treated as YAML, which accepts JSON too).
    fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string()))
            }
            Some("yaml") | Some("yml") | None => {
                serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))
            }
            Some(other) => Err(ConfigError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    fn apply_budget_env(
        mut raw: RawConfig,
        value: Option<String>,
    ) -> Result<RawConfig, ConfigError> {
        if let Some(value) = value {
            let budget: f64 = value.parse().map_err(|_| ConfigError::InvalidEnvVar {
                var: "GOLDGUARD_BUDGET_USD".to_string(),
                value: value.clone(),
            })?;
            raw.budget_usd = Some(budget);
        }
        Ok(raw)
    }

    /// Merge two raw layers; set values in `overlay` win, metric option maps
    /// merge entry by entry.
    fn merge_raw(base: RawConfig, overlay: RawConfig) -> RawConfig {
        let mut metrics = base.metrics;
        for (name, options) in overlay.metrics {
            let merged = match metrics.get(&name) {
                Some(existing) => existing.overlay(&options),
                None => options,
            };
            metrics.insert(name, merged);
        }

        RawConfig {
            defaults: RawDefaults {
                provider: overlay.defaults.provider.or(base.defaults.provider),
                model: overlay.defaults.model.or(base.defaults.model),
                temperature: overlay.defaults.temperature.or(base.defaults.temperature),
                metrics: overlay.defaults.metrics.or(base.defaults.metrics),
            },
            metrics,
            snapshots: RawSnapshots {
                backend: overlay.snapshots.backend.or(base.snapshots.backend),
                dir: overlay.snapshots.dir.or(base.snapshots.dir),
            },
            reporters: overlay.reporters.or(base.reporters),
            budget_usd: overlay.budget_usd.or(base.budget_usd),
            concurrency: overlay.concurrency.or(base.concurrency),
            fail_on: overlay.fail_on.or(base.fail_on),
        }
    }

    /// Apply defaults to whatever the layers left unset.
    fn finalize(raw: RawConfig) -> CoreConfig {
        let defaults = CoreConfig::default();

        let mut metrics = defaults.metrics;
        for (name, options) in raw.metrics {
            let merged = match metrics.get(&name) {
                Some(existing) => existing.overlay(&options),
                None => options,
            };
            metrics.insert(name, merged);
        }

        CoreConfig {
            defaults: DefaultsConfig {
                provider: raw.defaults.provider.unwrap_or(defaults.defaults.provider),
                model: raw.defaults.model.unwrap_or(defaults.defaults.model),
                temperature: raw
                    .defaults
                    .temperature
                    .unwrap_or(defaults.defaults.temperature),
                metrics: raw.defaults.metrics.unwrap_or(defaults.defaults.metrics),
            },
            metrics,
            snapshots: SnapshotsConfig {
                backend: raw.snapshots.backend.unwrap_or(defaults.snapshots.backend),
                dir: raw.snapshots.dir.unwrap_or(defaults.snapshots.dir),
            },
            reporters: raw.reporters.unwrap_or(defaults.reporters),
            budget_usd: raw.budget_usd.unwrap_or(defaults.budget_usd),
            concurrency: raw.concurrency.unwrap_or(defaults.concurrency),
            fail_on: raw.fail_on.unwrap_or(defaults.fail_on),
        }
    }
}

/// Resolve the effective, ordered metric set for one guard.
///
/// The source list is the guard's own metric set when non-empty, otherwise
/// `defaults.metrics`. Each entry starts from the global `metrics` map for
/// that name and is overlaid with the guard's contribution: specifier-derived
/// bounds (list form) or the per-metric options (map form). Listing a metric
/// opts it in; only a guard-level `enabled: false` drops it. A guard's
/// `judge_model` overrides the judge entry's model.
pub fn resolve_metrics(
    guard: &GuardConfig,
    config: &CoreConfig,
) -> Result<Vec<(String, MetricOptions)>, ConfigError> {
    let mut resolved = Vec::new();

    let mut push = |name: &str, mut options: MetricOptions| {
        if name == "judge" && guard.judge_model.is_some() {
            options.model = guard.judge_model.clone();
        }
        if options.enabled == Some(false) {
            return;
        }
        resolved.push((name.to_string(), options));
    };

    match &guard.metrics {
        MetricSet::Specs(specs) => {
            let source: &[String] = if specs.is_empty() {
                &config.defaults.metrics
            } else {
                specs
            };
            for spec_str in source {
                let spec: MetricSpec = spec_str.parse()?;
                let mut options = config.metrics.get(&spec.name).cloned().unwrap_or_default();
                if spec.min.is_some() {
                    options.min = spec.min;
                }
                if spec.max.is_some() {
                    options.max = spec.max;
                }
                options.enabled = Some(true);
                push(&spec.name, options);
            }
        }
        MetricSet::Options(map) => {
            for (name, overrides) in map {
                let base = config.metrics.get(name).cloned().unwrap_or_default();
                let mut options = base.overlay(overrides);
                options.enabled = Some(overrides.enabled.unwrap_or(true));
                push(name, options);
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ===== Defaults =====

    #[test]
    fn defaults_match_documented_values() {
        let config = CoreConfig::default();

        assert_eq!(config.defaults.provider, "anthropic");
        assert_eq!(config.defaults.metrics, vec!["exact", "semantic>=0.92"]);
        assert_eq!(config.snapshots.backend, "yaml");
        assert_eq!(config.snapshots.dir, PathBuf::from(".goldguard/snapshots"));
        assert_eq!(config.reporters, vec!["console"]);
        assert_eq!(config.budget_usd, 2.0);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.fail_on, FailPolicy::MustPass);

        let semantic = &config.metrics["semantic"];
        assert_eq!(semantic.provider.as_deref(), Some("hash-embed"));
        assert_eq!(semantic.min, Some(0.92));

        let judge = &config.metrics["judge"];
        assert_eq!(judge.enabled, Some(false));
        assert_eq!(judge.min, Some(8.0));
    }

    #[test]
    fn fail_policy_serde_round_trip() {
        let yaml = serde_yaml::to_string(&FailPolicy::MustPass).unwrap();
        assert_eq!(yaml.trim(), "must-pass");

        let parsed: FailPolicy = serde_yaml::from_str("any").unwrap();
        assert_eq!(parsed, FailPolicy::Any);
    }

    #[test]
    fn fail_policy_rejects_unknown_names() {
        let result: Result<FailPolicy, _> = serde_yaml::from_str("all");
        assert!(result.is_err());
    }

    #[test]
    fn fail_policy_display_matches_config_names() {
        assert_eq!(FailPolicy::MustPass.to_string(), "must-pass");
        assert_eq!(FailPolicy::Any.to_string(), "any");
        assert_eq!(FailPolicy::Average.to_string(), "average");
    }

    // ===== Guard config =====

    #[test]
    fn guard_config_builder_sets_fields() {
        let config = GuardConfig::new("greet")
            .metrics(["exact=1", "semantic>=0.9"])
            .store("memory")
            .provider("anthropic")
            .judge_model("gpt-4o-mini")
            .temperature(0.2)
            .concurrency(2);

        assert_eq!(config.id, "greet");
        assert_eq!(
            config.metrics,
            MetricSet::Specs(vec!["exact=1".to_string(), "semantic>=0.9".to_string()])
        );
        assert_eq!(config.store.as_deref(), Some("memory"));
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.concurrency, Some(2));
    }

    #[test]
    fn guard_config_metric_switches_to_map_form() {
        let config = GuardConfig::new("greet").metric(
            "exact",
            MetricOptions {
                must_pass: Some(true),
                ..MetricOptions::default()
            },
        );

        match &config.metrics {
            MetricSet::Options(map) => assert_eq!(map["exact"].must_pass, Some(true)),
            MetricSet::Specs(_) => panic!("expected map form"),
        }
    }

    #[test]
    fn metric_set_deserializes_both_forms() {
        let list: MetricSet = serde_yaml::from_str("[exact, \"semantic>=0.92\"]").unwrap();
        assert_eq!(
            list,
            MetricSet::Specs(vec!["exact".to_string(), "semantic>=0.92".to_string()])
        );

        let map: MetricSet = serde_yaml::from_str("exact:\n  must_pass: true\n").unwrap();
        match map {
            MetricSet::Options(map) => assert_eq!(map["exact"].must_pass, Some(true)),
            MetricSet::Specs(_) => panic!("expected map form"),
        }
    }

    // ===== Layer merging =====

    #[test]
    fn file_layer_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "defaults:\n  provider: openai\nsnapshots:\n  dir: custom/snapshots\nbudget_usd: 5.5\nfail_on: any\n"
        )
        .unwrap();

        let config = ConfigLoader::load_from(&path).unwrap();

        assert_eq!(config.defaults.provider, "openai");
        // Untouched fields keep their defaults.
        assert_eq!(config.defaults.metrics, vec!["exact", "semantic>=0.92"]);
        assert_eq!(config.snapshots.backend, "yaml");
        assert_eq!(config.snapshots.dir, PathBuf::from("custom/snapshots"));
        assert_eq!(config.budget_usd, 5.5);
        assert_eq!(config.fail_on, FailPolicy::Any);
    }

    #[test]
    fn file_metric_options_merge_into_default_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "metrics:\n  semantic:\n    min: 0.8\n").unwrap();

        let config = ConfigLoader::load_from(&path).unwrap();

        let semantic = &config.metrics["semantic"];
        assert_eq!(semantic.min, Some(0.8));
        // The default provider on the same entry survives the overlay.
        assert_eq!(semantic.provider.as_deref(), Some("hash-embed"));
    }

    #[test]
    fn json_files_parse_by_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"budget_usd": 9.0}"#).unwrap();

        let config = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(config.budget_usd, 9.0);
    }

    #[test]
    fn extensionless_rc_file_parses_as_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".goldguardrc");
        std::fs::write(&path, "concurrency: 7\n").unwrap();

        let config = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(config.concurrency, 7);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "budget_usd = 1.0\n").unwrap();

        let result = ConfigLoader::load_from(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_explicit_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ConfigLoader::load_from(tmp.path().join("nope.yaml")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "metrics: [unterminated\n").unwrap();

        let result = ConfigLoader::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn budget_env_overrides_file_value() {
        let raw = RawConfig {
            budget_usd: Some(3.0),
            ..RawConfig::default()
        };
        let raw = ConfigLoader::apply_budget_env(raw, Some("1.25".to_string())).unwrap();
        assert_eq!(raw.budget_usd, Some(1.25));
    }

    #[test]
    fn unparsable_budget_env_is_an_error() {
        let result =
            ConfigLoader::apply_budget_env(RawConfig::default(), Some("cheap".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn runtime_overrides_win_over_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "concurrency: 5\nbudget_usd: 4.0\n").unwrap();

        let runtime = RawConfig {
            concurrency: Some(9),
            ..RawConfig::default()
        };
        let config = ConfigLoader::load_with(Some(&path), runtime).unwrap();

        assert_eq!(config.concurrency, 9);
        assert_eq!(config.budget_usd, 4.0);
    }

    // ===== Metric resolution =====

    #[test]
    fn resolve_falls_back_to_default_metrics() {
        let guard = GuardConfig::new("greet");
        let config = CoreConfig::default();

        let resolved = resolve_metrics(&guard, &config).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].0, "exact");
        assert_eq!(resolved[1].0, "semantic");
        // The specifier bound and the global entry both contribute.
        assert_eq!(resolved[1].1.min, Some(0.92));
        assert_eq!(resolved[1].1.provider.as_deref(), Some("hash-embed"));
    }

    #[test]
    fn resolve_specifier_bound_overrides_global_entry() {
        let guard = GuardConfig::new("greet").metrics(["semantic>=0.99"]);
        let config = CoreConfig::default();

        let resolved = resolve_metrics(&guard, &config).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].1.min, Some(0.99));
    }

    #[test]
    fn resolve_listing_enables_a_globally_disabled_metric() {
        // judge is disabled in the default map; listing it opts in.
        let guard = GuardConfig::new("greet").metrics(["judge>=7"]);
        let config = CoreConfig::default();

        let resolved = resolve_metrics(&guard, &config).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, "judge");
        assert_eq!(resolved[0].1.min, Some(7.0));
        assert_eq!(resolved[0].1.enabled, Some(true));
    }

    #[test]
    fn resolve_map_form_overlays_global_entry() {
        let guard = GuardConfig::new("greet").metric(
            "semantic",
            MetricOptions {
                must_pass: Some(true),
                ..MetricOptions::default()
            },
        );
        let config = CoreConfig::default();

        let resolved = resolve_metrics(&guard, &config).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].1.must_pass, Some(true));
        assert_eq!(resolved[0].1.min, Some(0.92));
    }

    #[test]
    fn resolve_skips_guard_disabled_entries() {
        let guard = GuardConfig::new("greet").metric(
            "exact",
            MetricOptions {
                enabled: Some(false),
                ..MetricOptions::default()
            },
        );
        let config = CoreConfig::default();

        let resolved = resolve_metrics(&guard, &config).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn resolve_applies_guard_judge_model() {
        let guard = GuardConfig::new("greet")
            .metrics(["judge>=8"])
            .judge_model("gpt-4o");
        let config = CoreConfig::default();

        let resolved = resolve_metrics(&guard, &config).unwrap();
        assert_eq!(resolved[0].1.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn resolve_rejects_malformed_specifiers() {
        let guard = GuardConfig::new("greet").metrics(["exact>>1"]);
        let config = CoreConfig::default();

        assert!(matches!(
            resolve_metrics(&guard, &config),
            Err(ConfigError::InvalidMetricSpec(_))
        ));
    }

    #[test]
    fn metric_options_overlay_prefers_set_fields() {
        let base = MetricOptions {
            min: Some(0.5),
            provider: Some("hash-embed".to_string()),
            ..MetricOptions::default()
        };
        let overlay = MetricOptions {
            min: Some(0.9),
            must_pass: Some(true),
            ..MetricOptions::default()
        };

        let merged = base.overlay(&overlay);

        assert_eq!(merged.min, Some(0.9));
        assert_eq!(merged.provider.as_deref(), Some("hash-embed"));
        assert_eq!(merged.must_pass, Some(true));
    }
}
