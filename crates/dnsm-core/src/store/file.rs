// # File Record Store
//
// File-based implementation of RecordStore.
//
// ## Purpose
//
// Keeps the local mirror of provider state across server restarts in a
// single JSON document. Call volume is operator-driven, so every operation
// reads the whole document and every mutation rewrites it in full.
//
// ## Consistency
//
// - Fresh reads: the file is read on every call, nothing is cached
// - Atomic writes: new state is written to `<path>.tmp`, then renamed
// - Lazy creation: the file (and its parent directory) appear on first write
// - In-process exclusion: load, mutate and store run under one mutex so two
//   requests in the same server cannot lose each other's update. Separate
//   processes sharing a file are not coordinated.

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{Change, Stored};
use crate::Error;
use crate::model::{Record, RecordKey, Zone};
use crate::traits::record_store::RecordStore;

/// File-based record store
///
/// # Example
///
/// ```rust,no_run
/// use dnsm_core::store::FileRecordStore;
/// use dnsm_core::traits::RecordStore;
/// use dnsm_core::Zone;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRecordStore::new("/var/lib/dns-manager/manager.cache");
///
///     let was_present = store.record_zone(&Zone::new("example.com")).await?;
///     assert!(!was_present);
///
///     let zone = store.get_zone("example.com").await?;
///     assert!(zone.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Create a store backed by `path`
    ///
    /// Nothing is touched on disk until the first mutation.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full snapshot; a missing file is an empty store
    async fn load(&self) -> Result<Stored, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::trace!("Store file does not exist yet: {}", self.path.display());
                return Ok(Stored::default());
            }
            Err(e) => {
                return Err(Error::store(format!(
                    "Failed to read store file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            Error::store(format!(
                "Failed to parse store file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write the full snapshot atomically
    async fn store(&self, stored: &Stored) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_vec_pretty(stored)
            .map_err(|e| Error::store(format!("Failed to serialize store: {}", e)))?;

        let temp_path = self.temp_path();
        if let Err(e) = self.replace_with(&temp_path, &json).await {
            // Best effort, the original file is still intact
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::trace!(
            zones = stored.zones.len(),
            records = stored.records.len(),
            "Store written to {}",
            self.path.display()
        );
        Ok(())
    }

    /// Write `json` to `temp_path`, then move it over the store file
    async fn replace_with(&self, temp_path: &Path, json: &[u8]) -> Result<(), Error> {
        {
            let mut file = fs::File::create(temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })
    }

    /// Run one load-mutate-store cycle under the write lock
    ///
    /// The snapshot is only written back when `op` changed it.
    async fn modify<F>(&self, op: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut Stored) -> Change + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut stored = self.load().await?;
        let change = op(&mut stored);

        if change.needs_write() {
            self.store(&stored).await?;
        }

        Ok(change.was_present())
    }

    /// `<path>.tmp`, next to the store file
    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        let stored = self.load().await?;
        Ok(stored.find_zone(name).cloned())
    }

    async fn record_zone(&self, zone: &Zone) -> Result<bool, Error> {
        let zone = zone.clone();
        let found = self.modify(move |stored| stored.upsert_zone(zone)).await?;
        tracing::debug!(found, "Recorded zone");
        Ok(found)
    }

    async fn delete_zone(&self, name: &str) -> Result<bool, Error> {
        let found = self.modify(|stored| stored.remove_zone(name)).await?;
        tracing::debug!(zone = name, found, "Deleted zone from store");
        Ok(found)
    }

    async fn get_record(&self, key: &RecordKey) -> Result<Option<Record>, Error> {
        let stored = self.load().await?;
        Ok(stored.find_record(key).cloned())
    }

    async fn record_record(&self, record: &Record) -> Result<bool, Error> {
        let record = record.clone();
        let found = self.modify(move |stored| stored.upsert_record(record)).await?;
        tracing::debug!(found, "Recorded record");
        Ok(found)
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<bool, Error> {
        let found = self.modify(|stored| stored.remove_record(key)).await?;
        tracing::debug!(record = %key, found, "Deleted record from store");
        Ok(found)
    }
}
