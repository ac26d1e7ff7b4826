//! # Chaincode Gateway Runtime
//!
//! Wires the gateway subsystems into one explicitly constructed context
//! object and drives its lifecycle.
//!
//! ## Modules
//!
//! - `config` - TOML configuration with `CG_*` environment overrides
//! - `descriptors` - node descriptor directory loader
//! - `container` - `GatewayContainer`, owner of every subsystem instance
//! - `metrics_recorder` - bus consumer feeding the Prometheus metrics
//! - `devnet` - simulated network for running without external nodes
//!
//! ## Lifecycle
//!
//! ```text
//! GatewayConfig::load ──→ GatewayContainer::new ──→ connect(nodes)
//!                                                      │
//!                          registry.load ──→ topology.discover_all
//!                                                      │
//!                    orchestrator / queries / certificate_authority calls
//!                                                      │
//!                                                 disconnect()
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod container;
pub mod descriptors;
pub mod devnet;
pub mod metrics_recorder;

pub use config::{ConfigError, DevnetConfig, GatewayConfig, NodesConfig};
pub use container::{GatewayContainer, GatewayError};
pub use descriptors::{load_descriptor, load_descriptor_dir};
pub use devnet::Devnet;
pub use metrics_recorder::{spawn_metrics_recorder, MetricsRecorder};
