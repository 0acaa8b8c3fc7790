use crate::core::rate::RateSnapshot;
use crate::core::store::{DocumentKey, NewSnapshot, SnapshotStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory snapshot store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<DocumentKey, RateSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn replace(&self, key: &DocumentKey, snapshot: NewSnapshot) -> Result<RateSnapshot> {
        let snapshot = snapshot.stamp(Utc::now());
        let mut documents = self.inner.lock().await;
        debug!("Store REPLACE for key: {}", key);
        documents.insert(key.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<RateSnapshot>> {
        let documents = self.inner.lock().await;
        Ok(documents.get(key).cloned())
    }
}
