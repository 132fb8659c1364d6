//! The evaluation runner.
//!
//! A [`Runner`] drives one guarded function through the full pipeline:
//! resolve metrics, open the snapshot store, fingerprint the arguments, then
//! either record a first gold snapshot (bootstrap) or score the fresh output
//! against the recorded one and aggregate a verdict. Stores are opened once
//! per backend and cached for the runner's lifetime; metrics are initialized
//! fresh for every evaluation so per-guard options always apply.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use goldguard_core::{CoreConfig, GuardConfig, Registry, Runner, guard};
//!
//! let registry = Arc::new(Registry::with_builtins());
//! let mut runner = Runner::new(registry, CoreConfig::default());
//!
//! let greet = guard(GuardConfig::new("greet").metrics(["exact=1"]), my_fn);
//! let result = runner.test(&greet, "world".to_string()).await?;
//! assert!(result.passed);
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::config::{CoreConfig, FailPolicy, MetricOptions, resolve_metrics};
use crate::error::{Error, Result};
use crate::fingerprint;
use crate::guard::Guarded;
use crate::metric::{InitContext, ScoreInput};
use crate::registry::Registry;
use crate::report::{GuardResult, MetricScore};
use crate::store::{Snapshot, SnapshotStore, StoreOptions};

/// Drives guarded functions through snapshot, scoring, and reporting.
pub struct Runner {
    registry: Arc<Registry>,
    config: CoreConfig,
    /// Opened stores, keyed by backend name.
    stores: HashMap<String, Box<dyn SnapshotStore>>,
}

impl Runner {
    pub fn new(registry: Arc<Registry>, config: CoreConfig) -> Self {
        Self {
            registry,
            config,
            stores: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Evaluate one guarded call.
    ///
    /// With no snapshot on record, the fresh output becomes the gold answer
    /// and the result passes unconditionally. With a snapshot, every resolved
    /// metric scores the fresh output against it and the configured
    /// fail-policy decides the verdict. Either way the result is handed to
    /// every configured reporter before returning.
    ///
    /// Metric scoring failures abort the evaluation; there are no partial
    /// verdicts. Unknown metric or reporter names are logged and skipped,
    /// while an unknown store or provider is fatal.
    pub async fn test<A, F, Fut, E>(&mut self, guarded: &Guarded<F>, args: A) -> Result<GuardResult>
    where
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let guard_config = guarded.config();
        let id = guard_config.id.clone();

        // Resolve
        let resolved = resolve_metrics(guard_config, &self.config)?;

        // StoreInit
        let backend_name = guard_config
            .store
            .clone()
            .unwrap_or_else(|| self.config.snapshots.backend.clone());
        let store = match self.stores.entry(backend_name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let backend = self.registry.store_backend(entry.key())?;
                let opened = backend
                    .open(&StoreOptions {
                        dir: self.config.snapshots.dir.clone(),
                    })
                    .await?;
                entry.insert(opened)
            }
        };

        // Fingerprint + Lookup
        let prompt = fingerprint::canonical(&args)?;
        let print = fingerprint::digest(&prompt);
        let snapshot = store.load(&id, &print).await?;

        let result = match snapshot {
            None => {
                // Bootstrap: first observation becomes the gold answer.
                let started = Instant::now();
                let fresh = guarded
                    .call(args)
                    .await
                    .map_err(|e| Error::Target(Box::new(e)))?;
                let duration_ms = started.elapsed().as_millis() as u64;
                let snapshot = Snapshot::new(&id, &prompt, &fresh);
                store.save(&print, &snapshot).await?;
                tracing::info!(id = %id, fingerprint = %print, "recorded new gold snapshot");

                GuardResult {
                    id,
                    passed: true,
                    metrics: Vec::new(),
                    prompt,
                    gold_answer: fresh.clone(),
                    fresh_answer: fresh,
                    duration_ms,
                    cost_usd: 0.0,
                    bootstrapped: true,
                }
            }
            Some(snapshot) => {
                // Duration covers only the target invocation, not scoring.
                let started = Instant::now();
                let fresh = guarded
                    .call(args)
                    .await
                    .map_err(|e| Error::Target(Box::new(e)))?;
                let duration_ms = started.elapsed().as_millis() as u64;

                let metrics = self
                    .score_all(&resolved, &prompt, &snapshot.answer, &fresh)
                    .await?;
                let passed = check_pass(self.config.fail_on, &metrics);
                let cost_usd = metrics.iter().map(|m| m.cost_usd).sum();

                GuardResult {
                    id,
                    passed,
                    metrics,
                    prompt,
                    gold_answer: snapshot.answer,
                    fresh_answer: fresh,
                    duration_ms,
                    cost_usd,
                    bootstrapped: false,
                }
            }
        };

        self.report_all(&result).await;
        Ok(result)
    }

    /// Initialize and run every resolved metric. Unknown names are skipped;
    /// init or scoring failures abort with the metric's name attached.
    async fn score_all(
        &self,
        resolved: &[(String, MetricOptions)],
        prompt: &str,
        gold: &str,
        fresh: &str,
    ) -> Result<Vec<MetricScore>> {
        let ctx = InitContext {
            registry: self.registry.as_ref(),
            config: &self.config,
        };
        let input = ScoreInput {
            prompt,
            gold,
            fresh,
        };

        let mut scores = Vec::with_capacity(resolved.len());
        for (name, options) in resolved {
            let Ok(metric) = self.registry.metric(name) else {
                tracing::warn!(metric = %name, "unknown metric, skipping");
                continue;
            };

            let scorer = metric
                .init(options, &ctx)
                .await
                .map_err(|source| Error::Scoring {
                    metric: name.clone(),
                    source,
                })?;
            let score = scorer
                .score(&input)
                .await
                .map_err(|source| Error::Scoring {
                    metric: name.clone(),
                    source,
                })?;

            let min = options.min;
            let max = options.max;
            let passed =
                score.value >= min.unwrap_or(0.0) && max.is_none_or(|max| score.value <= max);
            tracing::debug!(metric = %name, value = score.value, passed, "scored metric");

            scores.push(MetricScore {
                name: name.clone(),
                value: score.value,
                passed,
                min,
                max,
                must_pass: options.must_pass.unwrap_or(false),
                cost_usd: score.cost_usd,
            });
        }
        Ok(scores)
    }

    /// Hand the result to every configured reporter. Reporters observe; a
    /// missing or failing reporter is logged and cannot change the verdict.
    async fn report_all(&self, result: &GuardResult) {
        for name in &self.config.reporters {
            let Ok(reporter) = self.registry.reporter(name) else {
                tracing::warn!(reporter = %name, "unknown reporter, skipping");
                continue;
            };
            if let Err(e) = reporter.report(result).await {
                tracing::warn!(reporter = %name, error = %e, "reporter failed");
            }
        }
    }
}

/// Reduce per-metric outcomes to one verdict.
fn check_pass(policy: FailPolicy, metrics: &[MetricScore]) -> bool {
    match policy {
        // Only metrics marked must_pass are binding; none marked means the
        // run passes on any outcome.
        FailPolicy::MustPass => metrics.iter().all(|m| !m.must_pass || m.passed),
        // Historical name; requires every metric to pass.
        FailPolicy::Any => metrics.iter().all(|m| m.passed),
        // Baseline comparison is not implemented; always passes.
        FailPolicy::Average => true,
    }
}
