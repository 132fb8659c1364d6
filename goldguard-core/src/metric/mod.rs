//! Scoring metrics.
//!
//! A [`Metric`] is a registered factory; [`Metric::init`] resolves its
//! dependencies (providers, rubric files) against one evaluation context and
//! returns a [`Scorer`] that holds them. The split keeps registration cheap
//! and global while everything context-dependent is bound per run, so a
//! metric initialized against one configuration never leaks state into
//! another.
//!
//! Built-ins: [`exact`], [`semantic`], [`judge`].

pub mod exact;
pub mod judge;
pub mod semantic;

pub use exact::ExactMetric;
pub use judge::JudgeMetric;
pub use semantic::SemanticMetric;

use async_trait::async_trait;

use crate::config::{CoreConfig, MetricOptions};
use crate::error::ScoringError;
use crate::registry::Registry;

/// What a metric factory gets to resolve its dependencies.
pub struct InitContext<'a> {
    pub registry: &'a Registry,
    pub config: &'a CoreConfig,
}

/// The texts one scoring call compares.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    /// Canonical serialization of the guarded call's arguments.
    pub prompt: &'a str,
    /// The snapshotted gold answer.
    pub gold: &'a str,
    /// The fresh output under evaluation.
    pub fresh: &'a str,
}

/// One metric's verdict on one comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Raw score on the metric's own scale.
    pub value: f64,
    /// Dollar cost of provider calls made while scoring.
    pub cost_usd: f64,
}

impl Score {
    pub fn free(value: f64) -> Self {
        Self {
            value,
            cost_usd: 0.0,
        }
    }
}

/// A registered metric factory.
#[async_trait]
pub trait Metric: Send + Sync {
    /// Stable name the metric is configured under.
    fn name(&self) -> &str;

    /// Bind the metric to one evaluation context.
    ///
    /// Resolution failures (unknown provider, unreadable rubric) surface here
    /// rather than mid-scoring.
    async fn init(
        &self,
        options: &MetricOptions,
        ctx: &InitContext<'_>,
    ) -> Result<Box<dyn Scorer>, ScoringError>;
}

impl std::fmt::Debug for dyn Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric").field("name", &self.name()).finish()
    }
}

/// A metric bound to one evaluation context, ready to score.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, input: &ScoreInput<'_>) -> Result<Score, ScoringError>;
}
