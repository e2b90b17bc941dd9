// # Remote Gateway Trait
//
// Defines the interface to the remote DNS provider's API.
//
// ## Implementations
//
// - NS1: `dnsm-provider-ns1` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsm_core::{RemoteGateway, Zone};
//
// let reply = gateway.create_zone(&Zone::new("example.com")).await?;
// if reply.is_success() {
//     println!("nameservers: {:?}", reply.entity.map(|z| z.dns_servers));
// }
// ```

use async_trait::async_trait;
use http::StatusCode;

use crate::model::{Record, RecordKey, Zone};

/// Reply of the provider to a single call
///
/// A reply exists whenever the provider answered, whatever the status. A
/// call that got no answer at all (connection refused, timeout, ...) is an
/// `Err` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply<T> {
    /// Status the provider answered with
    pub status: StatusCode,

    /// The decoded entity, present on success when the provider returned one
    pub entity: Option<T>,

    /// Raw response body, kept for verbatim relay of non-success replies
    pub body: String,
}

impl<T> GatewayReply<T> {
    /// A 200 reply carrying an entity
    pub fn ok(entity: T) -> Self {
        Self {
            status: StatusCode::OK,
            entity: Some(entity),
            body: String::new(),
        }
    }

    /// A reply with no entity (deletes, or provider failures)
    pub fn bare(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            entity: None,
            body: body.into(),
        }
    }

    /// Whether the provider reported success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Trait for remote gateway implementations
///
/// Gateways are thin: one provider call per method, no retries, no caching
/// and no access to the record store. Deciding between create and update is
/// the reconciler's job.
///
/// # Returns
///
/// - `Ok(GatewayReply)`: The provider answered (any status)
/// - `Err(Error)`: No answer was obtained
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Fetch a zone from the provider
    async fn get_zone(&self, name: &str) -> Result<GatewayReply<Zone>, crate::Error>;

    /// Create a zone that the provider does not know yet
    async fn create_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>, crate::Error>;

    /// Update a zone that already exists at the provider
    async fn update_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>, crate::Error>;

    /// Delete a zone; deletion is idempotent from the provider's view
    async fn delete_zone(&self, name: &str) -> Result<GatewayReply<()>, crate::Error>;

    /// Fetch a record from the provider
    async fn get_record(&self, key: &RecordKey) -> Result<GatewayReply<Record>, crate::Error>;

    /// Create a record that the provider does not know yet
    async fn create_record(&self, record: &Record) -> Result<GatewayReply<Record>, crate::Error>;

    /// Update a record that already exists at the provider
    async fn update_record(&self, record: &Record) -> Result<GatewayReply<Record>, crate::Error>;

    /// Delete a record
    async fn delete_record(&self, key: &RecordKey) -> Result<GatewayReply<()>, crate::Error>;

    /// Get the gateway name (for logging/debugging)
    fn gateway_name(&self) -> &'static str;
}

/// Helper trait for constructing gateways from configuration
pub trait GatewayFactory: Send + Sync {
    /// Create a RemoteGateway instance from configuration
    fn create(
        &self,
        config: &crate::config::GatewayConfig,
    ) -> Result<Box<dyn RemoteGateway>, crate::Error>;
}
