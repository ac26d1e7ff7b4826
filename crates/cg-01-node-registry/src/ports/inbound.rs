//! Inbound Ports (Driving Ports / API)

use crate::domain::RegistryError;
use async_trait::async_trait;
use shared_types::{CertificateAuthorityTransport, Node, NodeType, OrdererClient, PeerClient};
use std::sync::Arc;

/// Node registry API.
///
/// Consumers (identity switching, topology discovery, CA access, queries)
/// hold an `Arc<dyn NodeRegistryApi>`.
#[async_trait]
pub trait NodeRegistryApi: Send + Sync {
    /// Replace the registry contents with `nodes`, building one client
    /// handle per node. Returns the number of nodes loaded.
    async fn load(&self, nodes: Vec<Node>) -> Result<usize, RegistryError>;

    /// Look up a node by name.
    fn lookup(&self, name: &str) -> Result<Node, RegistryError>;

    /// Names of all nodes of `node_type`, in load order.
    fn names(&self, node_type: NodeType) -> Vec<String>;

    /// Peer client handle for `name`.
    fn peer_client(&self, name: &str) -> Result<Arc<dyn PeerClient>, RegistryError>;

    /// Orderer client handle for `name`.
    fn orderer_client(&self, name: &str) -> Result<Arc<dyn OrdererClient>, RegistryError>;

    /// Certificate authority client handle for `name`.
    fn ca_client(&self, name: &str)
        -> Result<Arc<dyn CertificateAuthorityTransport>, RegistryError>;
}
