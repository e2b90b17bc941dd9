//! Test doubles shared by the reconciler contract tests
//!
//! `ScriptedGateway` behaves like a small in-memory provider and counts every
//! call. `FailingStore` wraps a memory store and fails on demand.

#![allow(dead_code)]

use async_trait::async_trait;
use dnsm_core::error::{Error, Result};
use dnsm_core::store::MemoryRecordStore;
use dnsm_core::traits::{GatewayReply, RecordStore, RemoteGateway};
use dnsm_core::{ReadPolicy, Reconciler, Record, RecordKey, Zone};
use http::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Nameservers the scripted provider assigns to every zone it creates
pub const NAMESERVERS: [&str; 2] = ["dns1.p01.nsone.net", "dns2.p01.nsone.net"];

/// How the scripted provider answers the next calls
#[derive(Debug, Clone)]
pub enum Script {
    /// Behave like a real provider
    Serve,
    /// Answer every call with this status and body
    Reject(StatusCode, String),
    /// Never answer
    Unreachable,
}

#[derive(Default)]
struct Counters {
    get: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

struct Remote {
    zones: HashMap<String, Zone>,
    records: HashMap<RecordKey, Record>,
    revision: u64,
}

/// In-memory provider that counts calls; clones share state
#[derive(Clone)]
pub struct ScriptedGateway {
    counters: Arc<Counters>,
    remote: Arc<Mutex<Remote>>,
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            remote: Arc::new(Mutex::new(Remote {
                zones: HashMap::new(),
                records: HashMap::new(),
                revision: 0,
            })),
            script: Arc::new(Mutex::new(Script::Serve)),
        }
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn get_count(&self) -> usize {
        self.counters.get.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.counters.create.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.counters.update.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.counters.delete.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.get_count() + self.create_count() + self.update_count() + self.delete_count()
    }

    /// Put a zone at the provider behind the store's back
    pub fn seed_zone(&self, zone: Zone) {
        let mut remote = self.remote.lock().unwrap();
        remote.zones.insert(zone.zone.clone(), zone);
    }

    fn scripted<T>(&self) -> Option<Result<GatewayReply<T>>> {
        match self.script.lock().unwrap().clone() {
            Script::Serve => None,
            Script::Reject(status, body) => Some(Ok(GatewayReply::bare(status, body))),
            Script::Unreachable => Some(Err(Error::transport("connection refused"))),
        }
    }

    /// Stamp an entity the way a provider does, so tests can tell replies apart
    fn stamp(remote: &mut Remote, meta: &mut serde_json::Map<String, Value>) {
        remote.revision += 1;
        meta.insert("revision".to_string(), Value::from(remote.revision));
    }
}

fn not_found<T>(what: &str) -> GatewayReply<T> {
    GatewayReply::bare(
        StatusCode::NOT_FOUND,
        format!("{{\"message\":\"{} not found\"}}", what),
    )
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn get_zone(&self, name: &str) -> Result<GatewayReply<Zone>> {
        self.counters.get.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let remote = self.remote.lock().unwrap();
        Ok(match remote.zones.get(name) {
            Some(zone) => GatewayReply::ok(zone.clone()),
            None => not_found("zone"),
        })
    }

    async fn create_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>> {
        self.counters.create.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let mut remote = self.remote.lock().unwrap();
        let mut created = zone.clone();
        created.dns_servers = NAMESERVERS.iter().map(|s| s.to_string()).collect();
        Self::stamp(&mut remote, &mut created.meta);
        remote.zones.insert(created.zone.clone(), created.clone());
        Ok(GatewayReply::ok(created))
    }

    async fn update_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>> {
        self.counters.update.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let mut remote = self.remote.lock().unwrap();
        let mut updated = match remote.zones.get(zone.name()) {
            Some(existing) => existing.clone(),
            None => return Ok(not_found("zone")),
        };
        Self::stamp(&mut remote, &mut updated.meta);
        remote.zones.insert(updated.zone.clone(), updated.clone());
        Ok(GatewayReply::ok(updated))
    }

    async fn delete_zone(&self, name: &str) -> Result<GatewayReply<()>> {
        self.counters.delete.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let mut remote = self.remote.lock().unwrap();
        Ok(match remote.zones.remove(name) {
            Some(_) => GatewayReply::bare(StatusCode::OK, "{}"),
            None => not_found("zone"),
        })
    }

    async fn get_record(&self, key: &RecordKey) -> Result<GatewayReply<Record>> {
        self.counters.get.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let remote = self.remote.lock().unwrap();
        Ok(match remote.records.get(key) {
            Some(record) => GatewayReply::ok(record.clone()),
            None => not_found("record"),
        })
    }

    async fn create_record(&self, record: &Record) -> Result<GatewayReply<Record>> {
        self.counters.create.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let mut remote = self.remote.lock().unwrap();
        let mut created = record.clone();
        Self::stamp(&mut remote, &mut created.meta);
        remote.records.insert(created.key(), created.clone());
        Ok(GatewayReply::ok(created))
    }

    async fn update_record(&self, record: &Record) -> Result<GatewayReply<Record>> {
        self.counters.update.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let mut remote = self.remote.lock().unwrap();
        let mut updated = record.clone();
        Self::stamp(&mut remote, &mut updated.meta);
        remote.records.insert(updated.key(), updated.clone());
        Ok(GatewayReply::ok(updated))
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<GatewayReply<()>> {
        self.counters.delete.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted() {
            return reply;
        }
        let mut remote = self.remote.lock().unwrap();
        Ok(match remote.records.remove(key) {
            Some(_) => GatewayReply::bare(StatusCode::OK, "{}"),
            None => not_found("record"),
        })
    }

    fn gateway_name(&self) -> &'static str {
        "scripted"
    }
}

/// Memory store whose reads and writes can be made to fail
#[derive(Clone, Default)]
pub struct FailingStore {
    inner: MemoryRecordStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_count: Arc<AtomicUsize>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of mutations that reached the inner store
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::store("Failed to read store file manager.cache: disk on fire"));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::store("Failed to write to temp file manager.cache.tmp: no space left"));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>> {
        self.check_read()?;
        self.inner.get_zone(name).await
    }

    async fn record_zone(&self, zone: &Zone) -> Result<bool> {
        self.check_write()?;
        self.inner.record_zone(zone).await
    }

    async fn delete_zone(&self, name: &str) -> Result<bool> {
        self.check_write()?;
        self.inner.delete_zone(name).await
    }

    async fn get_record(&self, key: &RecordKey) -> Result<Option<Record>> {
        self.check_read()?;
        self.inner.get_record(key).await
    }

    async fn record_record(&self, record: &Record) -> Result<bool> {
        self.check_write()?;
        self.inner.record_record(record).await
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<bool> {
        self.check_write()?;
        self.inner.delete_record(key).await
    }
}

/// Reconciler over a fresh failing store and scripted gateway
pub fn harness(policy: ReadPolicy) -> (Reconciler, FailingStore, ScriptedGateway) {
    let store = FailingStore::new();
    let gateway = ScriptedGateway::new();
    let reconciler = Reconciler::new(
        Arc::new(store.clone()),
        Arc::new(gateway.clone()),
        policy,
    );
    (reconciler, store, gateway)
}

pub fn www_a() -> RecordKey {
    RecordKey::new("example.com", "www.example.com", "A")
}

pub fn answers(values: &[&str]) -> Vec<Vec<String>> {
    vec![values.iter().map(|v| v.to_string()).collect()]
}
