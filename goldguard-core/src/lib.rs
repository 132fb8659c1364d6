//! # goldguard-core
//!
//! Snapshot-based regression testing for functions backed by generative
//! models. Outputs drift run to run, so byte-equality assertions break; this
//! crate records a gold answer once, then scores fresh outputs against it
//! with configurable metrics and reduces the scores to a pass/fail verdict.
//!
//! ## Components
//!
//! - **Guard** ([`guard`], [`Guarded`]): attaches evaluation metadata to a
//!   function without changing its behavior
//! - **Runner** ([`Runner`]): drives the snapshot/score/aggregate pipeline
//! - **Registry** ([`Registry`]): named providers, metrics, stores, reporters
//! - **Metrics** ([`metric`]): `exact`, `semantic`, `judge`
//! - **Stores** ([`store`]): `yaml` files, in-memory
//! - **Reporters** ([`report`]): console blocks, GitHub Actions summaries
//! - **Config** ([`config`]): layered defaults / file / env / runtime
//!
//! ## Architecture
//!
//! ```text
//!   guarded fn ──▶ Runner ──▶ fingerprint ──▶ SnapshotStore
//!                    │                            │
//!                    │          none ◀── lookup ──┘
//!                    │            │ record gold, pass
//!                    │          found
//!                    ▼            ▼
//!                 Provider ◀── Scorers (exact / semantic / judge)
//!                                 │
//!                           fail-policy ──▶ GuardResult ──▶ Reporters
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use goldguard_core::{CoreConfig, GuardConfig, Registry, Runner, guard};
//!
//! #[tokio::main]
//! async fn main() -> goldguard_core::Result<()> {
//!     let registry = Arc::new(Registry::with_builtins());
//!     let mut runner = Runner::new(registry, CoreConfig::default());
//!
//!     let summarize = guard(
//!         GuardConfig::new("summarize").metrics(["semantic>=0.9"]),
//!         |text: String| async move { call_my_model(text).await },
//!     );
//!
//!     let result = runner.test(&summarize, "October sales report".to_string()).await?;
//!     println!("passed: {}", result.passed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod guard;
pub mod metric;
pub mod provider;
pub mod registry;
pub mod report;
pub mod runner;
pub mod store;
pub mod threshold;

// Core pipeline
pub use guard::{Guarded, guard};
pub use runner::Runner;

// Configuration
pub use config::{
    ConfigLoader, CoreConfig, FailPolicy, GuardConfig, MetricOptions, MetricSet, RawConfig,
};
pub use threshold::MetricSpec;

// Capability contracts
pub use metric::{Metric, Score, ScoreInput, Scorer};
pub use provider::{
    EmbedRequest, EmbedResponse, GenerateRequest, Generation, Pricing, Provider, Usage,
};
pub use report::{GuardResult, MetricScore, Reporter};
pub use store::{Snapshot, SnapshotStore, StoreBackend, StoreOptions};

// Registry and errors
pub use error::{Error, Result};
pub use registry::{PluginKind, Registry};
