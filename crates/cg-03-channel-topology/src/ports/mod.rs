//! Ports module for channel topology
//!
//! Peer and orderer clients (outbound) come from the node registry.

pub mod inbound;

pub use inbound::ChannelTopologyApi;
