//! Query Facade Service

use crate::domain::{group_by_name, ChannelPeerInfo, InstalledChaincode, QueryError};
use crate::ports::inbound::QueryApi;
use async_trait::async_trait;
use cg_01_node_registry::NodeRegistryApi;
use cg_02_identity_context::IdentityContextApi;
use cg_03_channel_topology::{Channel, ChannelTopologyApi, RepresentativePeer, TopologyError};
use shared_types::{ChaincodeInfo, NodeType};
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only listings over the registry, the topology and the peers.
pub struct QueryFacade {
    registry: Arc<dyn NodeRegistryApi>,
    identities: Arc<dyn IdentityContextApi>,
    topology: Arc<dyn ChannelTopologyApi>,
}

impl QueryFacade {
    /// Create the facade.
    pub fn new(
        registry: Arc<dyn NodeRegistryApi>,
        identities: Arc<dyn IdentityContextApi>,
        topology: Arc<dyn ChannelTopologyApi>,
    ) -> Self {
        Self {
            registry,
            identities,
            topology,
        }
    }

    async fn member(&self, channel: &str) -> Result<(Arc<Channel>, RepresentativePeer), QueryError> {
        let channel = self.topology.channel_or_discover(channel).await?;
        let peer = channel
            .representative()
            .ok_or_else(|| TopologyError::ChannelNotFound(channel.name().to_string()))?;
        Ok((channel, peer))
    }

    async fn msp_id_of(&self, peer: &str) -> Result<String, QueryError> {
        if let Some(msp_id) = self.registry.lookup(peer)?.msp_id {
            return Ok(msp_id);
        }
        let identity = self.identities.use_identity(peer).await?;
        Ok(identity.msp_id().to_string())
    }
}

#[async_trait]
impl QueryApi for QueryFacade {
    async fn list_installed_chaincode(&self, peer: &str) -> Result<InstalledChaincode, QueryError> {
        let client = self.registry.peer_client(peer)?;
        let result = {
            let scope = self.identities.scope(peer).await?;
            client.query_installed_chaincodes(scope.identity()).await
        };

        match result {
            Ok(installed) => Ok(group_by_name(installed)),
            Err(source) if source.is_access_denied() => {
                warn!(peer, error = %source, "No admin rights on peer, installed chaincode not listed");
                Ok(InstalledChaincode::new())
            }
            Err(source) => Err(QueryError::from_transport(peer, source)),
        }
    }

    async fn list_instantiated_chaincode(
        &self,
        channel: &str,
    ) -> Result<Vec<ChaincodeInfo>, QueryError> {
        let (channel, peer) = self.member(channel).await?;
        let scope = self.identities.scope(&peer.name).await?;

        let mut instantiated = peer
            .client
            .query_instantiated_chaincodes(scope.identity(), channel.name())
            .await
            .map_err(|source| QueryError::from_transport(&peer.name, source))?;
        instantiated.sort();
        Ok(instantiated)
    }

    async fn list_channels_for_peer(&self, peer: &str) -> Result<Vec<String>, QueryError> {
        let client = self.registry.peer_client(peer)?;
        let scope = self.identities.scope(peer).await?;

        let mut channels = client
            .query_channels(scope.identity())
            .await
            .map_err(|source| QueryError::from_transport(peer, source))?;
        channels.sort();
        channels.dedup();
        debug!(peer, count = channels.len(), "Listed channels");
        Ok(channels)
    }

    async fn list_organizations(&self, channel: &str) -> Result<Vec<String>, QueryError> {
        let (channel, peer) = self.member(channel).await?;
        let scope = self.identities.scope(&peer.name).await?;

        let mut organizations = peer
            .client
            .query_channel_organizations(scope.identity(), channel.name())
            .await
            .map_err(|source| QueryError::from_transport(&peer.name, source))?;
        organizations.sort();
        organizations.dedup();
        Ok(organizations)
    }

    fn list_peer_names(&self) -> Vec<String> {
        self.registry.names(NodeType::Peer)
    }

    fn list_orderer_names(&self) -> Vec<String> {
        self.registry.names(NodeType::Orderer)
    }

    fn list_certificate_authority_names(&self) -> Vec<String> {
        self.registry.names(NodeType::CertificateAuthority)
    }

    async fn list_peers_in_channel(&self, channel: &str) -> Result<Vec<String>, QueryError> {
        Ok(self.topology.channel_or_discover(channel).await?.peer_names())
    }

    async fn list_channel_peers_info(
        &self,
        channel: &str,
    ) -> Result<Vec<ChannelPeerInfo>, QueryError> {
        let channel = self.topology.channel_or_discover(channel).await?;

        let mut peers = Vec::new();
        for peer in channel.peer_names() {
            let msp_id = self.msp_id_of(&peer).await?;
            peers.push(ChannelPeerInfo { peer, msp_id });
        }
        Ok(peers)
    }
}
