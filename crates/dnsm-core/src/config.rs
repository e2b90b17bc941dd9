//! Configuration types for dns-manager
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default address the HTTP façade listens on (and the CLI talks to)
pub const DEFAULT_LISTEN: &str = "localhost:4444";

/// Default path of the store file
pub const DEFAULT_STORE_PATH: &str = "manager.cache";

/// Main dns-manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Remote gateway configuration
    pub gateway: GatewayConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP façade settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reconciliation settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl ManagerConfig {
    /// Create a configuration for the given gateway with defaults elsewhere
    pub fn new(gateway: GatewayConfig) -> Self {
        Self {
            gateway,
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.gateway.validate()?;
        self.store.validate()?;

        if self.server.listen.trim().is_empty() {
            return Err(crate::Error::config("Listen address cannot be empty"));
        }

        Ok(())
    }
}

/// Remote gateway configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayConfig {
    /// NS1 managed DNS
    Ns1 {
        /// NS1 API key
        api_key: String,
        /// API base URL (defaults to the public NS1 endpoint)
        #[serde(default)]
        endpoint: Option<String>,
    },

    /// Custom gateway
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl GatewayConfig {
    /// Validate the gateway configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            GatewayConfig::Ns1 { api_key, endpoint } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("NS1 API key cannot be empty"));
                }
                if let Some(url) = endpoint
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "NS1 endpoint must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            GatewayConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom gateway factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom gateway config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the gateway type name
    pub fn type_name(&self) -> &str {
        match self {
            GatewayConfig::Ns1 { .. } => "ns1",
            GatewayConfig::Custom { factory, .. } => factory,
        }
    }
}

// The API key must never show up in logs
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayConfig::Ns1 { endpoint, .. } => f
                .debug_struct("Ns1")
                .field("api_key", &"<REDACTED>")
                .field("endpoint", endpoint)
                .finish(),
            GatewayConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Single JSON file, rewritten on every mutation
    File {
        /// Path to the store file
        path: String,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: DEFAULT_STORE_PATH.to_string(),
        }
    }
}

/// HTTP façade settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

/// Reconciliation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// How reads treat a local cache hit
    #[serde(default)]
    pub read_policy: ReadPolicy,
}

/// How the read path treats entries already in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadPolicy {
    /// Serve a cache hit without calling the provider; fetch and populate on a miss
    #[default]
    CacheFirst,
    /// Always fetch from the provider and overwrite the local entry
    AlwaysRemote,
}

impl FromStr for ReadPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cache-first" => Ok(ReadPolicy::CacheFirst),
            "always-remote" => Ok(ReadPolicy::AlwaysRemote),
            other => Err(crate::Error::config(format!(
                "Unknown read policy '{}'. Valid: cache-first, always-remote",
                other
            ))),
        }
    }
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPolicy::CacheFirst => f.write_str("cache-first"),
            ReadPolicy::AlwaysRemote => f.write_str("always-remote"),
        }
    }
}
