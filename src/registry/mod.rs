//! In-memory registry of the items reported by each sidecar
//!
//! Every source owns exactly one [`SourceEntry`]: the item list from its most
//! recent report plus the time that report arrived. The entry map sits behind
//! a single lock so an item list and its timestamp are always written and
//! read together.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::Item;

/// Most recent report of a single source
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub items: Vec<Item>,
    pub last_seen: DateTime<Utc>,
}

/// Concurrent registry keyed by source identifier
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    entries: Arc<RwLock<HashMap<String, SourceEntry>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `source_id` and stamp it with the current time
    ///
    /// Returns the timestamp recorded for the entry.
    pub async fn upsert(&self, source_id: impl Into<String>, items: Vec<Item>) -> DateTime<Utc> {
        self.upsert_at(source_id.into(), items, Utc::now()).await
    }

    /// Upsert with an explicit clock reading.
    ///
    /// The stored timestamp never moves backwards for a given source, even if
    /// the wall clock does.
    pub(crate) async fn upsert_at(
        &self,
        source_id: String,
        items: Vec<Item>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let mut entries = self.entries.write().await;
        let last_seen = match entries.get(&source_id) {
            Some(previous) if previous.last_seen > now => previous.last_seen,
            _ => now,
        };

        debug!(
            source_id = %source_id,
            items = items.len(),
            "Registering items for source"
        );
        entries.insert(source_id, SourceEntry { items, last_seen });
        last_seen
    }

    /// Remove a source and its timestamp. Returns whether it was present.
    pub async fn delete(&self, source_id: &str) -> bool {
        self.entries.write().await.remove(source_id).is_some()
    }

    /// Remove a source only if it has not reported since `cutoff`.
    ///
    /// The check and the removal happen under one write lock, so a report
    /// that lands between a sweep's scan and its eviction keeps the source.
    pub async fn remove_if_stale(&self, source_id: &str, cutoff: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(source_id) {
            Some(entry) if entry.last_seen <= cutoff => {
                entries.remove(source_id);
                true
            }
            _ => false,
        }
    }

    /// Known source identifiers, in no particular order
    pub async fn list_source_ids(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// All reported items concatenated, in no particular order
    pub async fn snapshot(&self) -> Vec<Item> {
        let entries = self.entries.read().await;
        let total = entries.values().map(|entry| entry.items.len()).sum();
        let mut items = Vec::with_capacity(total);
        for entry in entries.values() {
            items.extend(entry.items.iter().cloned());
        }
        items
    }

    pub async fn last_seen(&self, source_id: &str) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .await
            .get(source_id)
            .map(|entry| entry.last_seen)
    }

    /// Every source with its last report time
    pub async fn last_seen_all(&self) -> Vec<(String, DateTime<Utc>)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(id, entry)| (id.clone(), entry.last_seen))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
