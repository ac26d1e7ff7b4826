//! # CG-01: Node Registry Subsystem
//!
//! Holds the configured network nodes (peers, orderers, certificate
//! authorities) keyed by unique name, and the client handle for each one.
//!
//! ## Architecture
//!
//! - **Domain**: `RegistryState` snapshot, `RegisteredNode`, errors
//! - **Ports**: Inbound (`NodeRegistryApi`); the outbound client factory
//!   lives in `shared-types`
//! - **Service**: `NodeRegistry`
//!
//! ## Behaviour
//!
//! - `load` replaces any prior state; client handles are constructed eagerly,
//!   one per node, and cached until the next load.
//! - Duplicate names are rejected, so every name maps to exactly one node.
//! - `names(type)` preserves load order; topology building relies on it to
//!   pick the first registered orderer.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{RegisteredNode, RegistryError, RegistryState};
pub use ports::NodeRegistryApi;
pub use service::NodeRegistry;
