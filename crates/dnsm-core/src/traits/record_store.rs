// # Record Store Trait
//
// Defines the interface for the local mirror of provider state.
//
// ## Purpose
//
// The record store remembers which zones and records are known to exist at
// the provider. The reconciler uses it to:
// - Choose between a create and an update call
// - Serve reads without a redundant remote lookup
//
// The store is never the source of truth: every successful provider reply
// overwrites the local entry.
//
// ## Implementations
//
// - File-based: a single JSON document (`FileRecordStore`)
// - In-memory: `MemoryRecordStore`, for tests and throwaway servers
//
// ## Usage
//
// ```rust,ignore
// use dnsm_core::{RecordStore, Zone};
//
// let was_present = store.record_zone(&Zone::new("example.com")).await?;
// assert!(!was_present);
// let zone = store.get_zone("example.com").await?;
// ```

use async_trait::async_trait;

use crate::model::{Record, RecordKey, Zone};

/// Trait for record store implementations
///
/// Every operation reads the current state fresh; nothing is cached across
/// calls. All errors (I/O, decode) are surfaced to the caller unchanged and
/// never retried at this layer.
///
/// # Upsert semantics
///
/// `record_*` replaces an entry with the same key in place, or appends it.
/// The returned flag reports whether the key was already present. Two
/// entries never share a key.
///
/// # Delete semantics
///
/// `delete_*` removes the entry by swapping it with the last one and
/// truncating, so the order of the remaining entries is not preserved. A
/// delete of an unknown key reports `false` and performs no write.
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a zone by name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Zone))`: The stored zone
    /// - `Ok(None)`: No zone with that name
    /// - `Err(Error)`: Storage error
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, crate::Error>;

    /// Upsert a zone, returning whether it was already present
    async fn record_zone(&self, zone: &Zone) -> Result<bool, crate::Error>;

    /// Remove a zone, returning whether it was present
    async fn delete_zone(&self, name: &str) -> Result<bool, crate::Error>;

    /// Look up a record by its (zone, domain, type) key
    async fn get_record(&self, key: &RecordKey) -> Result<Option<Record>, crate::Error>;

    /// Upsert a record, returning whether it was already present
    async fn record_record(&self, record: &Record) -> Result<bool, crate::Error>;

    /// Remove a record, returning whether it was present
    async fn delete_record(&self, key: &RecordKey) -> Result<bool, crate::Error>;
}
