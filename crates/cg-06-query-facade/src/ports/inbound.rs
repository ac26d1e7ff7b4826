//! Inbound Ports (Driving Ports / API)

use crate::domain::{ChannelPeerInfo, InstalledChaincode, QueryError};
use async_trait::async_trait;
use shared_types::ChaincodeInfo;

/// Read-only query API.
///
/// Every network query runs as one identity scope plus one call against
/// the node it addresses.
#[async_trait]
pub trait QueryApi: Send + Sync {
    /// Chaincode installed on `peer`. A peer that refuses the query for
    /// lack of admin rights yields an empty listing.
    async fn list_installed_chaincode(&self, peer: &str) -> Result<InstalledChaincode, QueryError>;

    /// Chaincode instantiated on `channel`.
    async fn list_instantiated_chaincode(
        &self,
        channel: &str,
    ) -> Result<Vec<ChaincodeInfo>, QueryError>;

    /// Channels `peer` has joined, sorted.
    async fn list_channels_for_peer(&self, peer: &str) -> Result<Vec<String>, QueryError>;

    /// MSP IDs of the organizations in `channel`, sorted and deduplicated.
    async fn list_organizations(&self, channel: &str) -> Result<Vec<String>, QueryError>;

    /// Registered peer names, in load order.
    fn list_peer_names(&self) -> Vec<String>;

    /// Registered orderer names, in load order.
    fn list_orderer_names(&self) -> Vec<String>;

    /// Registered certificate authority names, in load order.
    fn list_certificate_authority_names(&self) -> Vec<String>;

    /// Member peers of `channel`, sorted.
    async fn list_peers_in_channel(&self, channel: &str) -> Result<Vec<String>, QueryError>;

    /// Member peers of `channel` with their organization.
    async fn list_channel_peers_info(
        &self,
        channel: &str,
    ) -> Result<Vec<ChannelPeerInfo>, QueryError>;
}
