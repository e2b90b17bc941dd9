//! Core traits for dns-manager
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RecordStore`]: Keyed local mirror of zones and records
//! - [`RemoteGateway`]: Create/update/get/delete calls against the DNS provider

pub mod record_store;
pub mod remote_gateway;

pub use record_store::RecordStore;
pub use remote_gateway::{GatewayFactory, GatewayReply, RemoteGateway};
