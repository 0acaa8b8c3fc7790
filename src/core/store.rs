//! Snapshot persistence abstraction

use super::rate::{GoldRates, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Display;

/// Address of a snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: String,
    pub document: String,
}

impl DocumentKey {
    pub fn new(collection: &str, document: &str) -> Self {
        Self {
            collection: collection.to_string(),
            document: document.to_string(),
        }
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.document)
    }
}

/// A snapshot before the store has assigned its write time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub rates: GoldRates,
    pub unit: String,
    pub source: String,
}

impl NewSnapshot {
    pub fn stamp(self, updated_at: DateTime<Utc>) -> RateSnapshot {
        RateSnapshot {
            rates: self.rates,
            unit: self.unit,
            source: self.source,
            updated_at,
        }
    }
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replaces the document at `key`, assigning `updatedAt` at write time.
    /// Returns the document as written.
    async fn replace(&self, key: &DocumentKey, snapshot: NewSnapshot) -> Result<RateSnapshot>;

    async fn get(&self, key: &DocumentKey) -> Result<Option<RateSnapshot>>;
}
