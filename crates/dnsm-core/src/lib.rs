// # dnsm-core
//
// Core library for dns-manager.
//
// ## Architecture Overview
//
// This library keeps a local mirror of zones and records hosted by a remote
// DNS provider and uses it to decide between create and update calls:
// - **RecordStore**: Trait for the keyed local mirror (file or memory backed)
// - **RemoteGateway**: Trait for the provider API (create/update/get/delete)
// - **Reconciler**: Checks the store, calls the gateway, writes the
//   authoritative reply back and reports one `Outcome` per request
// - **GatewayRegistry**: Plugin-based registry for provider gateways
//
// ## Design Principles
//
// 1. **The provider is authoritative**: the store only ever mirrors successful replies
// 2. **Local existence decides create vs. update**: no speculative remote lookups
// 3. **Injected handles**: the store and gateway are passed in, never global
// 4. **Library-First**: the HTTP façade and CLI are thin layers over this crate

pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{GatewayConfig, ManagerConfig, ReadPolicy, StoreConfig};
pub use error::{Error, Result};
pub use model::{Answer, Record, RecordKey, Zone};
pub use reconcile::{Outcome, OutcomeBody, Reconciler};
pub use registry::GatewayRegistry;
pub use store::{FileRecordStore, MemoryRecordStore};
pub use traits::{GatewayReply, RecordStore, RemoteGateway};
