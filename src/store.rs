//! In-memory storage for generated plans. Bounded and time-evicting so the
//! map cannot grow for the life of the process.

use crate::domain::plan::Plan;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Everything the results view needs for one submission.
#[derive(Debug, Clone)]
pub struct StoredPlan {
    pub habits: Vec<String>,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct Entry {
    record: StoredPlan,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PlanStore {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
    capacity: usize,
    ttl: Duration,
}

impl PlanStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity,
            ttl,
        }
    }

    /// Stores a plan under a fresh random id and returns the id. Expired
    /// entries are swept first; if the store is still full, the oldest
    /// entry is evicted.
    pub async fn insert(&self, record: StoredPlan) -> Uuid {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);

        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.record.created_at)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                entries.remove(&id);
                tracing::debug!("Plan store full, evicted oldest entry {id}");
            }
        }

        let id = Uuid::new_v4();
        entries.insert(
            id,
            Entry {
                record,
                expires_at: now + self.ttl,
            },
        );
        id
    }

    /// Expired entries are treated as absent.
    pub async fn get(&self, id: Uuid) -> Option<StoredPlan> {
        let entries = self.entries.read().await;
        entries
            .get(&id)
            .filter(|entry| entry.expires_at > Utc::now())
            .map(|entry| entry.record.clone())
    }

    pub async fn remove(&self, id: Uuid) {
        let mut entries = self.entries.write().await;
        entries.remove(&id);
    }

    /// Drops expired entries and reports how many were removed. Run
    /// periodically by the scheduler.
    pub async fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();
        tracing::debug!("Plan store cleanup: {} active entries", entries.len());
        removed
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
