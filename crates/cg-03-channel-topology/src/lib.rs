//! # CG-03: Channel Topology Subsystem
//!
//! Discovers which ledger channels exist, which peers belong to each, and
//! binds every channel to an orderer and to one commit-event subscription
//! per member peer.
//!
//! ## Architecture
//!
//! - **Domain**: `Channel`, `OrdererBinding`, `TopologySnapshot`,
//!   `EventSubscription` / `CommitListener`, errors
//! - **Ports**: Inbound (`ChannelTopologyApi`)
//! - **Service**: `ChannelTopologyBuilder`
//!
//! ## Consistency
//!
//! Each discovery pass produces a new immutable `TopologySnapshot` with a
//! higher version. Readers take an `Arc` and keep it for the whole
//! operation, so a concurrent pass never changes a channel under a running
//! transaction.
//!
//! ## Known limitation
//!
//! One orderer per channel, chosen by `OrdererSelection::FirstRegistered`.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::TopologyConfig;
pub use domain::{
    Channel, CommitListener, EventError, EventSubscription, OrdererBinding, OrdererSelection,
    RepresentativePeer, TopologyError, TopologySnapshot,
};
pub use ports::ChannelTopologyApi;
pub use service::ChannelTopologyBuilder;
