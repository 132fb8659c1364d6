//! Snapshot persistence.
//!
//! A [`StoreBackend`] is a registered factory; [`StoreBackend::open`] binds it
//! to one evaluation context's options and returns the [`SnapshotStore`] the
//! runner reads and writes through. Snapshots are keyed by guard id plus the
//! fingerprint of the call's canonical arguments, so the same guard can hold
//! one gold answer per distinct input.

pub mod memory;
pub mod yaml;

pub use memory::MemoryStore;
pub use yaml::YamlStore;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One recorded gold answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Guard id the answer belongs to.
    pub id: String,
    /// Canonical serialization of the call's arguments.
    pub prompt: String,
    /// The recorded gold answer.
    pub answer: String,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Context-dependent store settings.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Base directory for file-backed stores.
    pub dir: PathBuf,
}

/// A registered store factory.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Stable name the backend is configured under.
    fn name(&self) -> &str;

    /// Bind the backend to one evaluation context's options.
    async fn open(&self, options: &StoreOptions) -> Result<Box<dyn SnapshotStore>, StoreError>;
}

/// An opened store the runner reads and writes snapshots through.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Fetch the snapshot for `(id, fingerprint)`; `Ok(None)` when absent.
    async fn load(&self, id: &str, fingerprint: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Record `snapshot` under `(snapshot.id, fingerprint)`, replacing any
    /// previous record with the same key.
    async fn save(&self, fingerprint: &str, snapshot: &Snapshot) -> Result<(), StoreError>;
}
