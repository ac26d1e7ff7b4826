//! Domain layer for read-only queries

pub mod errors;
pub mod listing;

pub use errors::QueryError;
pub use listing::{group_by_name, ChannelPeerInfo, InstalledChaincode};
