//! YAML-file snapshot store.
//!
//! Snapshots live at `<dir>/<id>/<fingerprint>.yaml`, one file per
//! `(id, fingerprint)` pair, so gold answers diff cleanly under version
//! control.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::{Snapshot, SnapshotStore, StoreBackend, StoreOptions};

/// Factory for the default file-backed store.
pub struct YamlStore;

#[async_trait]
impl StoreBackend for YamlStore {
    fn name(&self) -> &str {
        "yaml"
    }

    async fn open(&self, options: &StoreOptions) -> Result<Box<dyn SnapshotStore>, StoreError> {
        tokio::fs::create_dir_all(&options.dir).await?;
        Ok(Box::new(YamlSnapshotStore {
            dir: options.dir.clone(),
        }))
    }
}

struct YamlSnapshotStore {
    dir: PathBuf,
}

impl YamlSnapshotStore {
    fn path(&self, id: &str, fingerprint: &str) -> PathBuf {
        self.dir
            .join(sanitize(id))
            .join(format!("{fingerprint}.yaml"))
    }
}

/// Guard ids become directory names; anything path-hostile is replaced.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[async_trait]
impl SnapshotStore for YamlSnapshotStore {
    async fn load(&self, id: &str, fingerprint: &str) -> Result<Option<Snapshot>, StoreError> {
        let path = self.path(id, fingerprint);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_yaml::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(snapshot))
    }

    async fn save(&self, fingerprint: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        let path = self.path(&snapshot.id, fingerprint);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_yaml::to_string(snapshot)?;
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }
}
