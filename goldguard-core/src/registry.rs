//! Component registry.
//!
//! One [`Registry`] maps names to providers, metrics, store backends, and
//! reporters. Each capability lives in its own map, so a name collision
//! across kinds is legal and a component can never be resolved as the wrong
//! kind. Registries are plain values: build one, register what the run
//! needs, and hand it to a `Runner` behind an `Arc`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use goldguard_core::registry::Registry;
//!
//! let mut registry = Registry::with_builtins();
//! registry.register_provider(Arc::new(my_provider))?;
//! let runner = Runner::new(Arc::new(registry), config);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ComponentNotFound, ConfigError};
use crate::metric::{ExactMetric, JudgeMetric, Metric, SemanticMetric};
use crate::provider::Provider;
use crate::report::{ConsoleReporter, GitHubCheckReporter, Reporter};
use crate::store::{MemoryStore, StoreBackend, YamlStore};

/// The capability a registered component provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Provider,
    Metric,
    Store,
    Reporter,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginKind::Provider => "provider",
            PluginKind::Metric => "metric",
            PluginKind::Store => "store",
            PluginKind::Reporter => "reporter",
        };
        write!(f, "{name}")
    }
}

/// Name-to-component maps, one per capability.
#[derive(Default)]
pub struct Registry {
    providers: HashMap<String, Arc<dyn Provider>>,
    metrics: HashMap<String, Arc<dyn Metric>>,
    stores: HashMap<String, Arc<dyn StoreBackend>>,
    reporters: HashMap<String, Arc<dyn Reporter>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in metrics (`exact`, `semantic`,
    /// `judge`), stores (`yaml`, `memory`), and reporters (`console`,
    /// `github-check`). Providers are not included; register the adapters
    /// your run needs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .metrics
            .insert("exact".to_string(), Arc::new(ExactMetric));
        registry
            .metrics
            .insert("semantic".to_string(), Arc::new(SemanticMetric));
        registry
            .metrics
            .insert("judge".to_string(), Arc::new(JudgeMetric));
        registry
            .stores
            .insert("yaml".to_string(), Arc::new(YamlStore));
        registry
            .stores
            .insert("memory".to_string(), Arc::new(MemoryStore::new()));
        registry
            .reporters
            .insert("console".to_string(), Arc::new(ConsoleReporter));
        registry
            .reporters
            .insert("github-check".to_string(), Arc::new(GitHubCheckReporter::new()));
        registry
    }

    pub fn register_provider(&mut self, provider: Arc<dyn Provider>) -> Result<(), ConfigError> {
        let name = provider.name().to_string();
        validate_name(PluginKind::Provider, &name)?;
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::debug!(name = %name, "replacing registered provider");
        }
        Ok(())
    }

    pub fn register_metric(&mut self, metric: Arc<dyn Metric>) -> Result<(), ConfigError> {
        let name = metric.name().to_string();
        validate_name(PluginKind::Metric, &name)?;
        if self.metrics.insert(name.clone(), metric).is_some() {
            tracing::debug!(name = %name, "replacing registered metric");
        }
        Ok(())
    }

    pub fn register_store(&mut self, store: Arc<dyn StoreBackend>) -> Result<(), ConfigError> {
        let name = store.name().to_string();
        validate_name(PluginKind::Store, &name)?;
        if self.stores.insert(name.clone(), store).is_some() {
            tracing::debug!(name = %name, "replacing registered store");
        }
        Ok(())
    }

    pub fn register_reporter(&mut self, reporter: Arc<dyn Reporter>) -> Result<(), ConfigError> {
        let name = reporter.name().to_string();
        validate_name(PluginKind::Reporter, &name)?;
        if self.reporters.insert(name.clone(), reporter).is_some() {
            tracing::debug!(name = %name, "replacing registered reporter");
        }
        Ok(())
    }

    pub fn provider(&self, name: &str) -> Result<Arc<dyn Provider>, ComponentNotFound> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentNotFound {
                kind: PluginKind::Provider,
                name: name.to_string(),
            })
    }

    pub fn metric(&self, name: &str) -> Result<Arc<dyn Metric>, ComponentNotFound> {
        self.metrics
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentNotFound {
                kind: PluginKind::Metric,
                name: name.to_string(),
            })
    }

    pub fn store_backend(&self, name: &str) -> Result<Arc<dyn StoreBackend>, ComponentNotFound> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentNotFound {
                kind: PluginKind::Store,
                name: name.to_string(),
            })
    }

    pub fn reporter(&self, name: &str) -> Result<Arc<dyn Reporter>, ComponentNotFound> {
        self.reporters
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentNotFound {
                kind: PluginKind::Reporter,
                name: name.to_string(),
            })
    }

    /// Registered names for one kind, sorted.
    pub fn list(&self, kind: PluginKind) -> Vec<String> {
        let mut names: Vec<String> = match kind {
            PluginKind::Provider => self.providers.keys().cloned().collect(),
            PluginKind::Metric => self.metrics.keys().cloned().collect(),
            PluginKind::Store => self.stores.keys().cloned().collect(),
            PluginKind::Reporter => self.reporters.keys().cloned().collect(),
        };
        names.sort();
        names
    }
}

/// Names come from config files, so they share the metric-specifier grammar:
/// ASCII alphanumerics, `_`, `-`, non-empty.
fn validate_name(kind: PluginKind, name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidPluginName {
            kind,
            name: name.to_string(),
        })
    }
}
