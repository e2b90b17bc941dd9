//! Plugin-based gateway registry
//!
//! Gateways are registered by name at startup and instantiated from
//! [`GatewayConfig`], so the binary never matches on provider types itself.
//!
//! ## Registration
//!
//! Gateway crates expose a `register` function:
//!
//! ```rust,ignore
//! // In dnsm-provider-ns1
//! pub fn register(registry: &GatewayRegistry) {
//!     registry.register_gateway("ns1", Box::new(Ns1Factory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::traits::{GatewayFactory, RemoteGateway};

/// Registry of remote gateway factories
///
/// Uses interior mutability, so registration only needs `&self`. A lock
/// poisoned by a panicking writer is recovered, since the map itself is
/// never left half-updated.
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: RwLock<HashMap<String, Box<dyn GatewayFactory>>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gateway factory, replacing any factory of the same name
    pub fn register_gateway(&self, name: impl Into<String>, factory: Box<dyn GatewayFactory>) {
        let mut gateways = self.gateways.write().unwrap_or_else(PoisonError::into_inner);
        gateways.insert(name.into(), factory);
    }

    /// Create a gateway from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RemoteGateway>)`: Created gateway
    /// - `Err(Error::Config)`: The gateway type is not registered
    /// - `Err(Error)`: The factory rejected the configuration
    pub fn create_gateway(&self, config: &GatewayConfig) -> Result<Box<dyn RemoteGateway>> {
        let gateway_type = config.type_name();
        let gateways = self.gateways.read().unwrap_or_else(PoisonError::into_inner);

        let factory = gateways
            .get(gateway_type)
            .ok_or_else(|| Error::config(format!("Unknown gateway type: {}", gateway_type)))?;

        factory.create(config)
    }

    /// Registered gateway names, sorted
    pub fn list_gateways(&self) -> Vec<String> {
        let gateways = self.gateways.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = gateways.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_gateway(&self, name: &str) -> bool {
        let gateways = self.gateways.read().unwrap_or_else(PoisonError::into_inner);
        gateways.contains_key(name)
    }
}
