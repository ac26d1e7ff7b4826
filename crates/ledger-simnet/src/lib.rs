//! # Ledger Simnet
//!
//! An in-process simulated ledger network. `SimulatedNetwork` implements
//! `NodeClientFactory`, so a registry loaded through it gets peer, orderer
//! and CA clients that talk to shared in-memory state instead of the wire.
//!
//! ## What it simulates
//!
//! - Peers: joined channels, installed chaincode, endorsement, commit feeds
//! - Orderers: broadcast acknowledgement, block cutting, commit delivery
//! - CAs: enrollment against scripted users, registration of new IDs
//!
//! ## Scripting
//!
//! Every behavior the gateway has to cope with can be forced per node:
//! access denial, transport failure, non-200 endorsements, rejected
//! broadcasts, invalid validation codes, failing or silent event feeds.
//! Every proposal and broadcast is recorded for later assertions.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod network;

pub use adapters::{SimCertificateAuthority, SimOrderer, SimPeer};
pub use network::{BroadcastRecord, ProposalRecord, SimulatedNetwork};
