// # Record Store Implementations
//
// This module provides implementations of the RecordStore trait for
// different persistence strategies. Both share the `Stored` snapshot type,
// which owns the upsert and swap-remove rules.

pub mod file;
pub mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::model::{Record, RecordKey, Zone};
use crate::traits::RecordStore;

/// Build the store described by `config`
pub fn open(config: &StoreConfig) -> Arc<dyn RecordStore> {
    match config {
        StoreConfig::File { path } => {
            tracing::debug!("Using file store at {}", path);
            Arc::new(FileRecordStore::new(path))
        }
        StoreConfig::Memory => {
            tracing::debug!("Using in-memory store");
            Arc::new(MemoryRecordStore::new())
        }
    }
}

/// Full snapshot of the store, also the on-disk document
///
/// ```json
/// {
///   "Zones": [{"zone": "example.com", "dns_servers": ["dns1.p01.nsone.net"]}],
///   "Records": [{"zone": "example.com", "domain": "www.example.com", "type": "A",
///                "answers": [{"answer": ["1.2.3.4"]}]}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stored {
    #[serde(rename = "Zones", default)]
    pub zones: Vec<Zone>,

    #[serde(rename = "Records", default)]
    pub records: Vec<Record>,
}

/// What a mutation did to a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Change {
    Replaced,
    Appended,
    Removed,
    Missing,
}

impl Change {
    /// Whether the key existed before the mutation
    pub(crate) fn was_present(self) -> bool {
        matches!(self, Change::Replaced | Change::Removed)
    }

    /// Whether the snapshot needs to be written back
    pub(crate) fn needs_write(self) -> bool {
        !matches!(self, Change::Missing)
    }
}

impl Stored {
    pub fn find_zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name() == name)
    }

    pub fn find_record(&self, key: &RecordKey) -> Option<&Record> {
        self.records.iter().find(|r| r.matches(key))
    }

    pub(crate) fn upsert_zone(&mut self, zone: Zone) -> Change {
        match self.zones.iter_mut().find(|z| z.name() == zone.name()) {
            Some(slot) => {
                *slot = zone;
                Change::Replaced
            }
            None => {
                self.zones.push(zone);
                Change::Appended
            }
        }
    }

    pub(crate) fn remove_zone(&mut self, name: &str) -> Change {
        match self.zones.iter().position(|z| z.name() == name) {
            Some(idx) => {
                self.zones.swap_remove(idx);
                Change::Removed
            }
            None => Change::Missing,
        }
    }

    pub(crate) fn upsert_record(&mut self, record: Record) -> Change {
        let key = record.key();
        match self.records.iter_mut().find(|r| r.matches(&key)) {
            Some(slot) => {
                *slot = record;
                Change::Replaced
            }
            None => {
                self.records.push(record);
                Change::Appended
            }
        }
    }

    pub(crate) fn remove_record(&mut self, key: &RecordKey) -> Change {
        match self.records.iter().position(|r| r.matches(key)) {
            Some(idx) => {
                self.records.swap_remove(idx);
                Change::Removed
            }
            None => Change::Missing,
        }
    }
}
