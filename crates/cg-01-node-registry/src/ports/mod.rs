//! Ports module for the Node Registry
//!
//! The client factory (outbound) lives in `shared-types`; this crate only
//! defines the inbound API other subsystems consume.

pub mod inbound;

pub use inbound::NodeRegistryApi;
