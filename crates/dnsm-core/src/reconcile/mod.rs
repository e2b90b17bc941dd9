//! Reconciliation between the local record store and the remote provider
//!
//! The [`Reconciler`] is the only place that talks to both sides:
//!
//! ```text
//!                  ┌──────────────┐
//!   request ──────▶│  Reconciler  │──────▶ Outcome
//!                  └──────────────┘
//!                    │          │
//!        check/upsert│          │get/create/update/delete
//!                    ▼          ▼
//!            ┌─────────────┐ ┌───────────────┐
//!            │ RecordStore │ │ RemoteGateway │
//!            └─────────────┘ └───────────────┘
//! ```
//!
//! ## Write path
//!
//! 1. Look the key up in the store
//! 2. Absent: `create` at the provider. Present: `update`
//! 3. On a successful reply carrying an entity, upsert it locally. A
//!    successful reply whose body did not decode keeps its status, skips the
//!    store and is reported as a diagnostic
//!
//! ## Delete path
//!
//! The provider is called first, with no local check. The local entry is
//! only removed once the provider confirmed the delete.
//!
//! A failed remote call never writes to the store. A failed store write
//! after a successful remote call keeps the remote status and is reported
//! as a diagnostic.

use http::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ReadPolicy;
use crate::error::Error;
use crate::model::{Record, RecordKey, Zone};
use crate::traits::{GatewayReply, RecordStore, RemoteGateway};

/// Body of an [`Outcome`]
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeBody<T> {
    /// A provider entity, rendered as JSON
    Entity(T),
    /// Plain text: an error message or a relayed provider body
    Text(String),
    /// Nothing to send
    Empty,
}

/// Result of one reconciler call, ready to be turned into a response
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub status: StatusCode,
    pub body: OutcomeBody<T>,

    /// Non-fatal problems, such as a store write that failed after the
    /// provider accepted the change
    pub diagnostics: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn entity(status: StatusCode, entity: T) -> Self {
        Self::new(status, OutcomeBody::Entity(entity))
    }

    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status, OutcomeBody::Text(text.into()))
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, OutcomeBody::Empty)
    }

    /// 503 with an explanatory message
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::text(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The entity, if the body carries one
    pub fn entity_ref(&self) -> Option<&T> {
        match &self.body {
            OutcomeBody::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    fn new(status: StatusCode, body: OutcomeBody<T>) -> Self {
        Self {
            status,
            body,
            diagnostics: Vec::new(),
        }
    }

    fn with_diagnostic(mut self, diagnostic: Option<String>) -> Self {
        self.diagnostics.extend(diagnostic);
        self
    }
}

/// A successful provider reply
struct Accepted<T> {
    status: StatusCode,
    entity: Option<T>,
    body: String,
}

impl<T> Accepted<T> {
    fn into_outcome(self) -> Outcome<T> {
        match self.entity {
            Some(entity) => Outcome::entity(self.status, entity),
            None => Outcome::empty(self.status),
        }
    }

    /// Diagnostic for a reply that carried a body the gateway could not decode
    fn undecoded(&self, kind: &str) -> Option<String> {
        if self.entity.is_some() || self.body.trim().is_empty() {
            return None;
        }
        warn!(status = %self.status, "Provider reply could not be decoded, {} not recorded", kind);
        Some(format!("problem recording {}: provider reply could not be decoded", kind))
    }
}

/// Coordinates the record store and the remote gateway
///
/// Cheap to share: both sides are held behind `Arc`.
///
/// ```rust,ignore
/// let reconciler = Reconciler::new(store, gateway, ReadPolicy::CacheFirst);
/// let outcome = reconciler.put_zone(Zone::new("example.com")).await;
/// assert!(outcome.is_success());
/// ```
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn RemoteGateway>,
    read_policy: ReadPolicy,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        gateway: Arc<dyn RemoteGateway>,
        read_policy: ReadPolicy,
    ) -> Self {
        Self {
            store,
            gateway,
            read_policy,
        }
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
    }

    /// Read a zone according to the read policy
    pub async fn get_zone(&self, name: &str) -> Outcome<Zone> {
        if self.read_policy == ReadPolicy::CacheFirst {
            match self.store.get_zone(name).await {
                Ok(Some(zone)) => {
                    debug!(zone = name, "Serving zone from store");
                    return Outcome::entity(StatusCode::OK, zone);
                }
                Ok(None) => debug!(zone = name, "Zone not in store, asking provider"),
                Err(e) => return Outcome::unavailable(format!("problem checking for zone: {}", e)),
            }
        }

        let accepted = match self.accept("fetching", self.gateway.get_zone(name).await) {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome,
        };

        let diagnostic = match &accepted.entity {
            Some(zone) => self.remember_zone(zone).await,
            None => accepted.undecoded("zone"),
        };
        accepted.into_outcome().with_diagnostic(diagnostic)
    }

    /// Create or update a zone at the provider, then mirror it locally
    pub async fn put_zone(&self, zone: Zone) -> Outcome<Zone> {
        let known = match self.store.get_zone(zone.name()).await {
            Ok(found) => found.is_some(),
            Err(e) => return Outcome::unavailable(format!("problem checking for zone: {}", e)),
        };

        let reply = if known {
            info!(zone = zone.name(), gateway = self.gateway.gateway_name(), "Updating zone");
            self.gateway.update_zone(&zone).await
        } else {
            info!(zone = zone.name(), gateway = self.gateway.gateway_name(), "Creating zone");
            self.gateway.create_zone(&zone).await
        };

        let accepted = match self.accept("updating", reply) {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome,
        };

        let diagnostic = match &accepted.entity {
            Some(zone) => self.remember_zone(zone).await,
            None => accepted.undecoded("zone"),
        };
        accepted.into_outcome().with_diagnostic(diagnostic)
    }

    /// Delete a zone at the provider, then forget it locally
    pub async fn delete_zone(&self, name: &str) -> Outcome<Zone> {
        info!(zone = name, gateway = self.gateway.gateway_name(), "Deleting zone");

        let accepted = match self.accept("updating", self.gateway.delete_zone(name).await) {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome.discard_entity(),
        };

        let diagnostic = match self.store.delete_zone(name).await {
            Ok(found) => {
                debug!(zone = name, found, "Zone removed from store");
                None
            }
            Err(e) => {
                warn!(zone = name, error = %e, "Provider deleted zone but store update failed");
                Some(format!("problem removing zone: {}", e))
            }
        };

        Outcome::empty(accepted.status).with_diagnostic(diagnostic)
    }

    /// Read a record according to the read policy
    pub async fn get_record(&self, key: &RecordKey) -> Outcome<Record> {
        if self.read_policy == ReadPolicy::CacheFirst {
            match self.store.get_record(key).await {
                Ok(Some(record)) => {
                    debug!(record = %key, "Serving record from store");
                    return Outcome::entity(StatusCode::OK, record);
                }
                Ok(None) => debug!(record = %key, "Record not in store, asking provider"),
                Err(e) => {
                    return Outcome::unavailable(format!("problem checking for record: {}", e));
                }
            }
        }

        let accepted = match self.accept("fetching", self.gateway.get_record(key).await) {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome,
        };

        let diagnostic = match &accepted.entity {
            Some(record) => self.remember_record(record).await,
            None => accepted.undecoded("record"),
        };
        accepted.into_outcome().with_diagnostic(diagnostic)
    }

    /// Create or update a record at the provider, then mirror it locally
    pub async fn put_record(&self, record: Record) -> Outcome<Record> {
        let key = record.key();
        let known = match self.store.get_record(&key).await {
            Ok(found) => found.is_some(),
            Err(e) => return Outcome::unavailable(format!("problem checking for record: {}", e)),
        };

        let reply = if known {
            info!(record = %key, gateway = self.gateway.gateway_name(), "Updating record");
            self.gateway.update_record(&record).await
        } else {
            info!(record = %key, gateway = self.gateway.gateway_name(), "Creating record");
            self.gateway.create_record(&record).await
        };

        let accepted = match self.accept("updating", reply) {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome,
        };

        let diagnostic = match &accepted.entity {
            Some(record) => self.remember_record(record).await,
            None => accepted.undecoded("record"),
        };
        accepted.into_outcome().with_diagnostic(diagnostic)
    }

    /// Delete a record at the provider, then forget it locally
    pub async fn delete_record(&self, key: &RecordKey) -> Outcome<Record> {
        info!(record = %key, gateway = self.gateway.gateway_name(), "Deleting record");

        let accepted = match self.accept("updating", self.gateway.delete_record(key).await) {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome.discard_entity(),
        };

        let diagnostic = match self.store.delete_record(key).await {
            Ok(found) => {
                debug!(record = %key, found, "Record removed from store");
                None
            }
            Err(e) => {
                warn!(record = %key, error = %e, "Provider deleted record but store update failed");
                Some(format!("problem removing record: {}", e))
            }
        };

        Outcome::empty(accepted.status).with_diagnostic(diagnostic)
    }

    /// Split a gateway result into an accepted reply or a final outcome
    fn accept<T>(
        &self,
        action: &str,
        result: Result<GatewayReply<T>, Error>,
    ) -> Result<Accepted<T>, Outcome<T>> {
        match result {
            Ok(reply) if reply.is_success() => Ok(Accepted {
                status: reply.status,
                entity: reply.entity,
                body: reply.body,
            }),
            Ok(reply) => {
                warn!(
                    gateway = self.gateway.gateway_name(),
                    status = %reply.status,
                    "Provider rejected request"
                );
                Err(Outcome::text(reply.status, reply.body))
            }
            Err(e) => Err(Outcome::unavailable(format!(
                "problem {} {}: {}",
                action,
                self.gateway.gateway_name(),
                e
            ))),
        }
    }

    async fn remember_zone(&self, zone: &Zone) -> Option<String> {
        match self.store.record_zone(zone).await {
            Ok(_) => None,
            Err(e) => {
                warn!(zone = zone.name(), error = %e, "Provider accepted zone but store update failed");
                Some(format!("problem recording zone: {}", e))
            }
        }
    }

    async fn remember_record(&self, record: &Record) -> Option<String> {
        match self.store.record_record(record).await {
            Ok(_) => None,
            Err(e) => {
                warn!(record = %record.key(), error = %e, "Provider accepted record but store update failed");
                Some(format!("problem recording record: {}", e))
            }
        }
    }
}

impl Outcome<()> {
    /// Retype an entity-less outcome
    fn discard_entity<T>(self) -> Outcome<T> {
        let body = match self.body {
            OutcomeBody::Text(text) => OutcomeBody::Text(text),
            OutcomeBody::Entity(()) | OutcomeBody::Empty => OutcomeBody::Empty,
        };
        Outcome {
            status: self.status,
            body,
            diagnostics: self.diagnostics,
        }
    }
}
