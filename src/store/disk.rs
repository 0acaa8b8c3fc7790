use crate::core::rate::RateSnapshot;
use crate::core::store::{DocumentKey, NewSnapshot, SnapshotStore};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

/// Snapshot store backed by a fjall keyspace. Each collection is a partition
/// and each document a JSON value under its document key.
pub struct DiskStore {
    keyspace: Keyspace,
    partitions: RwLock<HashMap<String, PartitionHandle>>,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!("Opened snapshot store at {}", path.display());

        Ok(Self {
            keyspace,
            partitions: RwLock::new(HashMap::new()),
        })
    }

    fn partition(&self, collection: &str) -> Result<PartitionHandle> {
        if let Some(partition) = self
            .partitions
            .read()
            .map_err(|_| anyhow!("Partition registry lock poisoned"))?
            .get(collection)
        {
            return Ok(partition.clone());
        }

        validate_collection_name(collection)?;
        let mut partitions = self
            .partitions
            .write()
            .map_err(|_| anyhow!("Partition registry lock poisoned"))?;
        if let Some(partition) = partitions.get(collection) {
            return Ok(partition.clone());
        }
        let partition = self
            .keyspace
            .open_partition(collection, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open collection: {collection}"))?;
        partitions.insert(collection.to_string(), partition.clone());
        Ok(partition)
    }
}

fn validate_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 255
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        bail!("Invalid collection name: {name:?}");
    }
    Ok(())
}

#[async_trait]
impl SnapshotStore for DiskStore {
    async fn replace(&self, key: &DocumentKey, snapshot: NewSnapshot) -> Result<RateSnapshot> {
        let partition = self.partition(&key.collection)?;
        let snapshot = snapshot.stamp(Utc::now());
        let bytes = serde_json::to_vec(&snapshot)?;

        partition
            .insert(key.document.as_bytes(), bytes)
            .with_context(|| format!("Failed to write document {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .with_context(|| format!("Failed to persist document {key}"))?;
        debug!("Store REPLACE for key: {}", key);
        Ok(snapshot)
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<RateSnapshot>> {
        let partition = self.partition(&key.collection)?;
        match partition.get(key.document.as_bytes())? {
            Some(bytes) => {
                let snapshot = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt document {key}"))?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::{GoldRates, RoundingLaw};
    use tempfile::tempdir;

    fn new_snapshot(xau_rate: f64) -> NewSnapshot {
        NewSnapshot {
            rates: GoldRates::from_xau_rate(xau_rate, RoundingLaw::default()).unwrap(),
            unit: "INR/gram".to_string(),
            source: "metalpriceapi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disk_store_replace_and_get() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        let key = DocumentKey::new("goldRates", "india");

        assert!(store.get(&key).await.unwrap().is_none());

        let written = store.replace(&key, new_snapshot(0.00035)).await.unwrap();
        let read = store.get(&key).await.unwrap().unwrap();
        assert_eq!(read, written);
        assert_eq!(read.unit, "INR/gram");
    }

    #[tokio::test]
    async fn test_disk_store_overwrites_document() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        let key = DocumentKey::new("goldRates", "india");

        store.replace(&key, new_snapshot(0.00035)).await.unwrap();
        let second = store.replace(&key, new_snapshot(0.0004)).await.unwrap();

        assert_eq!(store.get(&key).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let key = DocumentKey::new("goldRates", "india");

        let store = DiskStore::open(dir.path()).unwrap();
        let written = store.replace(&key, new_snapshot(0.00035)).await.unwrap();
        drop(store);

        let reopened = DiskStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get(&key).await.unwrap(), Some(written));
    }

    #[tokio::test]
    async fn test_disk_store_keeps_documents_apart() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        let india = DocumentKey::new("goldRates", "india");
        let archive = DocumentKey::new("archive", "india");

        let written = store.replace(&india, new_snapshot(0.00035)).await.unwrap();

        assert!(store.get(&archive).await.unwrap().is_none());
        assert_eq!(store.get(&india).await.unwrap(), Some(written));
    }

    #[tokio::test]
    async fn test_disk_store_rejects_bad_collection_name() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        let key = DocumentKey::new("gold rates/india", "india");

        let result = store.replace(&key, new_snapshot(0.00035)).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid collection name")
        );
    }
}
