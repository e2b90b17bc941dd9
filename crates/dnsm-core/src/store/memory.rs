// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// Nothing survives a restart. Used by the contract tests and by
// `dns-manager server --memory-store`, where every first write of a name
// becomes a create call again after a restart.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Change, Stored};
use crate::Error;
use crate::model::{Record, RecordKey, Zone};
use crate::traits::record_store::RecordStore;

/// In-memory record store
///
/// Cloning shares the underlying snapshot.
///
/// # Example
///
/// ```rust,no_run
/// use dnsm_core::store::MemoryRecordStore;
/// use dnsm_core::traits::RecordStore;
/// use dnsm_core::Zone;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///     store.record_zone(&Zone::new("example.com")).await?;
///     assert_eq!(store.zone_count().await, 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Stored>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(stored: Stored) -> Self {
        Self {
            inner: Arc::new(RwLock::new(stored)),
        }
    }

    /// Copy of the current snapshot
    pub async fn snapshot(&self) -> Stored {
        self.inner.read().await.clone()
    }

    pub async fn zone_count(&self) -> usize {
        self.inner.read().await.zones.len()
    }

    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn clear(&self) {
        *self.inner.write().await = Stored::default();
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        Ok(self.inner.read().await.find_zone(name).cloned())
    }

    async fn record_zone(&self, zone: &Zone) -> Result<bool, Error> {
        let change = self.inner.write().await.upsert_zone(zone.clone());
        Ok(change.was_present())
    }

    async fn delete_zone(&self, name: &str) -> Result<bool, Error> {
        let change = self.inner.write().await.remove_zone(name);
        Ok(change == Change::Removed)
    }

    async fn get_record(&self, key: &RecordKey) -> Result<Option<Record>, Error> {
        Ok(self.inner.read().await.find_record(key).cloned())
    }

    async fn record_record(&self, record: &Record) -> Result<bool, Error> {
        let change = self.inner.write().await.upsert_record(record.clone());
        Ok(change.was_present())
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<bool, Error> {
        let change = self.inner.write().await.remove_record(key);
        Ok(change == Change::Removed)
    }
}
