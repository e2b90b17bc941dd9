//! `dns-manager server`: wires config, store, gateway and the HTTP façade

use anyhow::Context;
use clap::Args;
use dnsm_core::config::{
    DEFAULT_LISTEN, DEFAULT_STORE_PATH, GatewayConfig, ManagerConfig, ReadPolicy, StoreConfig,
};
use dnsm_core::{GatewayRegistry, Reconciler};
use dnsm_http::AppState;
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

#[derive(Args)]
pub struct ServerArgs {
    /// The address to listen for client requests on
    #[arg(short = 'L', long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// The path to use to store local records of DNS states
    #[arg(short = 's', long, default_value = DEFAULT_STORE_PATH)]
    pub store: String,

    /// How reads treat entries already in the store
    #[arg(long, default_value_t = ReadPolicy::CacheFirst)]
    pub read_policy: ReadPolicy,

    /// Keep state in memory only (forgotten on exit)
    #[arg(long, conflicts_with = "store")]
    pub memory_store: bool,
}

/// Build the server configuration from flags and environment
pub fn config_from_args(args: &ServerArgs) -> Result<ManagerConfig, dnsm_core::Error> {
    let api_key = std::env::var("NS1_APIKEY").unwrap_or_default();
    if api_key.is_empty() {
        return Err(dnsm_core::Error::config(
            "NS1_APIKEY environment variable is not set, giving up. \
             Obtain a key from https://my.nsone.net/#/account/settings",
        ));
    }

    let endpoint = std::env::var("NS1_ENDPOINT")
        .ok()
        .filter(|e| !e.is_empty());

    let mut config = ManagerConfig::new(GatewayConfig::Ns1 { api_key, endpoint });
    config.server.listen = args.listen.clone();
    config.reconcile.read_policy = args.read_policy;
    config.store = if args.memory_store {
        StoreConfig::Memory
    } else {
        StoreConfig::File {
            path: args.store.clone(),
        }
    };

    config.validate()?;
    Ok(config)
}

/// Register the built-in gateways
fn registry() -> GatewayRegistry {
    let registry = GatewayRegistry::new();

    #[cfg(feature = "ns1")]
    dnsm_provider_ns1::register(&registry);

    registry
}

/// Run the server until SIGINT or SIGTERM
pub async fn run(config: ManagerConfig) -> anyhow::Result<()> {
    info!("Starting dns-manager server");
    info!("Gateway: {:?}", config.gateway);
    info!("Store: {:?}", config.store);
    info!("Read policy: {}", config.reconcile.read_policy);

    if matches!(config.store, StoreConfig::Memory) {
        warn!("Using in-memory store, every zone and record will be created again after a restart");
    }

    let gateway = registry().create_gateway(&config.gateway)?;
    let store = dnsm_core::store::open(&config.store);
    let reconciler = Reconciler::new(store, Arc::from(gateway), config.reconcile.read_policy);

    dnsm_http::serve(&config.server.listen, AppState::new(reconciler), shutdown_signal())
        .await
        .with_context(|| format!("Server on {} failed", config.server.listen))?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on the first SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to install signal handlers, falling back to CTRL-C: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", name);
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to wait for CTRL-C: {}", e);
        return;
    }
    info!("Received shutdown signal: SIGINT");
}
