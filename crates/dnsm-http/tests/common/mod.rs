//! Test doubles for the router tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dnsm_core::traits::{GatewayReply, RecordStore, RemoteGateway};
use dnsm_core::{Error, MemoryRecordStore, ReadPolicy, Reconciler, Record, RecordKey, Result, Zone};
use dnsm_http::{AppState, create_routes};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Provider double: accepts everything unless told otherwise
#[derive(Clone, Default)]
pub struct FakeNs1 {
    calls: Arc<Mutex<Vec<String>>>,
    reject: Arc<Mutex<Option<(StatusCode, String)>>>,
    unreachable: Arc<AtomicBool>,
}

impl FakeNs1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far, as "verb target"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reject_with(&self, status: StatusCode, body: &str) {
        *self.reject.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn go_offline(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    fn answer<T>(&self, call: String, entity: Option<T>) -> Result<GatewayReply<T>> {
        self.calls.lock().unwrap().push(call);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::transport("NS1 request failed: connection refused"));
        }
        if let Some((status, body)) = self.reject.lock().unwrap().clone() {
            return Ok(GatewayReply::bare(status, body));
        }
        Ok(match entity {
            Some(entity) => GatewayReply::ok(entity),
            None => GatewayReply::bare(StatusCode::OK, "{}"),
        })
    }
}

fn served_zone(name: &str, serial: u64) -> Zone {
    let mut zone = Zone::new(name);
    zone.dns_servers = vec!["dns1.p01.nsone.net".to_string(), "dns2.p01.nsone.net".to_string()];
    zone.meta.insert("serial".to_string(), Value::from(serial));
    zone
}

#[async_trait]
impl RemoteGateway for FakeNs1 {
    async fn get_zone(&self, name: &str) -> Result<GatewayReply<Zone>> {
        self.answer(format!("get {}", name), Some(served_zone(name, 0)))
    }

    async fn create_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>> {
        self.answer(format!("create {}", zone.name()), Some(served_zone(zone.name(), 1)))
    }

    async fn update_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>> {
        self.answer(format!("update {}", zone.name()), Some(served_zone(zone.name(), 2)))
    }

    async fn delete_zone(&self, name: &str) -> Result<GatewayReply<()>> {
        self.answer(format!("delete {}", name), None)
    }

    async fn get_record(&self, key: &RecordKey) -> Result<GatewayReply<Record>> {
        self.answer(format!("get {}", key), Some(Record::new(key.clone())))
    }

    async fn create_record(&self, record: &Record) -> Result<GatewayReply<Record>> {
        self.answer(format!("create {}", record.key()), Some(record.clone()))
    }

    async fn update_record(&self, record: &Record) -> Result<GatewayReply<Record>> {
        self.answer(format!("update {}", record.key()), Some(record.clone()))
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<GatewayReply<()>> {
        self.answer(format!("delete {}", key), None)
    }

    fn gateway_name(&self) -> &'static str {
        "ns1"
    }
}

/// Memory store whose writes fail
#[derive(Clone, Default)]
pub struct ReadOnlyStore {
    inner: MemoryRecordStore,
    writes_attempted: Arc<AtomicUsize>,
}

impl ReadOnlyStore {
    pub fn writes_attempted(&self) -> usize {
        self.writes_attempted.load(Ordering::SeqCst)
    }

    fn refuse(&self) -> Error {
        self.writes_attempted.fetch_add(1, Ordering::SeqCst);
        Error::store("Failed to create temp file manager.cache.tmp: read-only file system")
    }
}

#[async_trait]
impl RecordStore for ReadOnlyStore {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>> {
        self.inner.get_zone(name).await
    }

    async fn record_zone(&self, _zone: &Zone) -> Result<bool> {
        Err(self.refuse())
    }

    async fn delete_zone(&self, _name: &str) -> Result<bool> {
        Err(self.refuse())
    }

    async fn get_record(&self, key: &RecordKey) -> Result<Option<Record>> {
        self.inner.get_record(key).await
    }

    async fn record_record(&self, _record: &Record) -> Result<bool> {
        Err(self.refuse())
    }

    async fn delete_record(&self, _key: &RecordKey) -> Result<bool> {
        Err(self.refuse())
    }
}

pub fn router(store: Arc<dyn RecordStore>, gateway: FakeNs1) -> Router {
    let reconciler = Reconciler::new(store, Arc::new(gateway), ReadPolicy::CacheFirst);
    create_routes(AppState::new(reconciler))
}

pub struct Reply {
    pub status: StatusCode,
    pub store_error: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    };
    let store_error = header(dnsm_http::STORE_ERROR_HEADER);
    let content_type = header("content-type");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    Reply {
        status,
        store_error,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}
