//! Simulated client adapters.
//!
//! Each adapter is a thin handle naming one node; all behavior lives in the
//! shared `SimulatedNetwork` state.

use crate::network::SimulatedNetwork;
use async_trait::async_trait;
use shared_types::{
    BroadcastRequest, BroadcastResponse, CertificateAuthorityTransport, ChaincodeInfo,
    CommitEventFeed, EndorsementResponse, Enrollment, OrdererClient, PeerClient, Proposal,
    RegistrationRequest, SigningIdentity, TransportError,
};
use tracing::debug;

/// Simulated peer client.
pub struct SimPeer {
    name: String,
    network: SimulatedNetwork,
}

impl SimPeer {
    pub(crate) fn new(name: &str, network: SimulatedNetwork) -> Self {
        Self {
            name: name.to_string(),
            network,
        }
    }
}

#[async_trait]
impl PeerClient for SimPeer {
    fn node_name(&self) -> &str {
        &self.name
    }

    async fn query_channels(&self, signer: &SigningIdentity) -> Result<Vec<String>, TransportError> {
        debug!(peer = %self.name, signer = %signer, "[simnet] query channels");
        self.network.peer_channels(&self.name)
    }

    async fn query_installed_chaincodes(
        &self,
        signer: &SigningIdentity,
    ) -> Result<Vec<ChaincodeInfo>, TransportError> {
        debug!(peer = %self.name, signer = %signer, "[simnet] query installed chaincode");
        self.network.peer_installed(&self.name)
    }

    async fn query_instantiated_chaincodes(
        &self,
        signer: &SigningIdentity,
        channel: &str,
    ) -> Result<Vec<ChaincodeInfo>, TransportError> {
        debug!(peer = %self.name, signer = %signer, channel, "[simnet] query instantiated chaincode");
        self.network.peer_instantiated(&self.name, channel)
    }

    async fn query_channel_organizations(
        &self,
        signer: &SigningIdentity,
        channel: &str,
    ) -> Result<Vec<String>, TransportError> {
        debug!(peer = %self.name, signer = %signer, channel, "[simnet] query organizations");
        self.network.peer_organizations(&self.name, channel)
    }

    async fn send_proposal(
        &self,
        signer: &SigningIdentity,
        proposal: &Proposal,
    ) -> EndorsementResponse {
        debug!(peer = %self.name, tx_id = %proposal.tx_id, kind = ?proposal.kind, "[simnet] proposal");
        self.network.endorse(&self.name, signer, proposal)
    }

    async fn open_commit_feed(
        &self,
        _signer: &SigningIdentity,
        channel: &str,
    ) -> Result<CommitEventFeed, TransportError> {
        self.network.open_feed(&self.name, channel)
    }
}

/// Simulated orderer client.
pub struct SimOrderer {
    name: String,
    network: SimulatedNetwork,
}

impl SimOrderer {
    pub(crate) fn new(name: &str, network: SimulatedNetwork) -> Self {
        Self {
            name: name.to_string(),
            network,
        }
    }
}

#[async_trait]
impl OrdererClient for SimOrderer {
    fn node_name(&self) -> &str {
        &self.name
    }

    async fn broadcast(
        &self,
        signer: &SigningIdentity,
        request: &BroadcastRequest,
    ) -> Result<BroadcastResponse, TransportError> {
        debug!(orderer = %self.name, tx_id = %request.tx_id, channel = %request.channel, "[simnet] broadcast");
        self.network.order(&self.name, signer, request)
    }
}

/// Simulated certificate authority client.
pub struct SimCertificateAuthority {
    name: String,
    network: SimulatedNetwork,
}

impl SimCertificateAuthority {
    pub(crate) fn new(name: &str, network: SimulatedNetwork) -> Self {
        Self {
            name: name.to_string(),
            network,
        }
    }
}

#[async_trait]
impl CertificateAuthorityTransport for SimCertificateAuthority {
    fn node_name(&self) -> &str {
        &self.name
    }

    async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, TransportError> {
        self.network.ca_enroll(&self.name, enrollment_id, secret)
    }

    async fn register(
        &self,
        registrar: &SigningIdentity,
        request: &RegistrationRequest,
    ) -> Result<String, TransportError> {
        self.network.ca_register(&self.name, registrar, request)
    }
}
