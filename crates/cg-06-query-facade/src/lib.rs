//! # CG-06: Query Facade Subsystem
//!
//! Read-only listings: installed and instantiated chaincode, channel
//! membership, organizations and registered nodes.
//!
//! Missing admin rights on a peer are an expected condition for ordinary
//! users, so `list_installed_chaincode` returns an empty listing when the
//! peer denies access. Every other query surfaces access denial as an
//! error.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{ChannelPeerInfo, InstalledChaincode, QueryError};
pub use ports::QueryApi;
pub use service::QueryFacade;
