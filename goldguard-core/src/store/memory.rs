//! In-memory snapshot store for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{Snapshot, SnapshotStore, StoreBackend, StoreOptions};

type Key = (String, String);

/// Factory for a process-local store. The backend owns the data; every
/// [`StoreBackend::open`] hands out a handle onto the same map, so snapshots
/// survive across contexts within one process and vanish with it.
#[derive(Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<Key, Snapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open(&self, _options: &StoreOptions) -> Result<Box<dyn SnapshotStore>, StoreError> {
        Ok(Box::new(MemorySnapshotStore {
            data: Arc::clone(&self.data),
        }))
    }
}

struct MemorySnapshotStore {
    data: Arc<RwLock<HashMap<Key, Snapshot>>>,
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, id: &str, fingerprint: &str) -> Result<Option<Snapshot>, StoreError> {
        let data = self.data.read().await;
        Ok(data.get(&(id.to_string(), fingerprint.to_string())).cloned())
    }

    async fn save(&self, fingerprint: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.insert(
            (snapshot.id.clone(), fingerprint.to_string()),
            snapshot.clone(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = MemoryStore::new().open(&StoreOptions::default()).await.unwrap();
        let snapshot = Snapshot::new("greet", "[\"hi\"]", "hello");

        store.save("abc", &snapshot).await.unwrap();
        assert_eq!(store.load("greet", "abc").await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let store = MemoryStore::new().open(&StoreOptions::default()).await.unwrap();
        assert!(store.load("greet", "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saving_the_same_key_replaces_the_record() {
        let store = MemoryStore::new().open(&StoreOptions::default()).await.unwrap();

        store
            .save("abc", &Snapshot::new("greet", "[\"hi\"]", "first"))
            .await
            .unwrap();
        store
            .save("abc", &Snapshot::new("greet", "[\"hi\"]", "second"))
            .await
            .unwrap();

        let loaded = store.load("greet", "abc").await.unwrap().unwrap();
        assert_eq!(loaded.answer, "second");
    }

    #[tokio::test]
    async fn handles_from_separate_opens_share_data() {
        let backend = MemoryStore::new();
        let writer = backend.open(&StoreOptions::default()).await.unwrap();
        let reader = backend.open(&StoreOptions::default()).await.unwrap();

        writer
            .save("abc", &Snapshot::new("greet", "[\"hi\"]", "hello"))
            .await
            .unwrap();

        assert!(reader.load("greet", "abc").await.unwrap().is_some());
    }
}
