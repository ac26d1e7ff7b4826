//! Node Registry Service
//!
//! Main service implementing `NodeRegistryApi`.

use crate::domain::{RegisteredNode, RegistryError, RegistryState};
use crate::ports::inbound::NodeRegistryApi;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, GatewayEvent, NoopPublisher};
use shared_types::{
    CertificateAuthorityTransport, Node, NodeClient, NodeClientFactory, NodeType, OrdererClient,
    PeerClient,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of configured network nodes.
///
/// Holds an immutable `RegistryState` behind a lock; `load` builds the
/// replacement off to the side and swaps it in.
pub struct NodeRegistry {
    factory: Arc<dyn NodeClientFactory>,
    state: RwLock<Arc<RegistryState>>,
    publisher: Arc<dyn EventPublisher>,
}

impl NodeRegistry {
    /// Create an empty registry that builds clients through `factory`.
    pub fn new(factory: Arc<dyn NodeClientFactory>) -> Self {
        Self::with_publisher(factory, Arc::new(NoopPublisher))
    }

    /// Create an empty registry that reports loads on `publisher`.
    pub fn with_publisher(
        factory: Arc<dyn NodeClientFactory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            factory,
            state: RwLock::new(Arc::new(RegistryState::default())),
            publisher,
        }
    }

    /// Current snapshot (copy-on-read).
    pub fn snapshot(&self) -> Arc<RegistryState> {
        self.state.read().clone()
    }

    /// All loaded nodes, in load order.
    pub fn nodes(&self) -> Vec<Node> {
        self.snapshot().nodes().map(|entry| entry.node.clone()).collect()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().get(name).is_some()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Drop every node and client handle.
    pub fn clear(&self) {
        *self.state.write() = Arc::new(RegistryState::default());
        debug!("Node registry cleared");
    }

    fn entry(&self, name: &str) -> Result<RegisteredNode, RegistryError> {
        self.snapshot()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NodeNotFound(name.to_string()))
    }

    fn wrong_type(entry: &RegisteredNode, expected: NodeType) -> RegistryError {
        RegistryError::WrongNodeType {
            name: entry.node.name.clone(),
            expected,
            actual: entry.node.node_type,
        }
    }
}

#[async_trait]
impl NodeRegistryApi for NodeRegistry {
    async fn load(&self, nodes: Vec<Node>) -> Result<usize, RegistryError> {
        let state = RegistryState::build(nodes, self.factory.as_ref())?;
        let count = state.len();

        info!(
            nodes = count,
            peers = state.names(NodeType::Peer).len(),
            orderers = state.names(NodeType::Orderer).len(),
            cas = state.names(NodeType::CertificateAuthority).len(),
            "Node registry loaded"
        );

        *self.state.write() = Arc::new(state);
        self.publisher
            .publish(GatewayEvent::RegistryLoaded { nodes: count })
            .await;

        Ok(count)
    }

    fn lookup(&self, name: &str) -> Result<Node, RegistryError> {
        self.entry(name).map(|entry| entry.node)
    }

    fn names(&self, node_type: NodeType) -> Vec<String> {
        self.snapshot().names(node_type)
    }

    fn peer_client(&self, name: &str) -> Result<Arc<dyn PeerClient>, RegistryError> {
        let entry = self.entry(name)?;
        match entry.client {
            NodeClient::Peer(client) => Ok(client),
            _ => Err(Self::wrong_type(&entry, NodeType::Peer)),
        }
    }

    fn orderer_client(&self, name: &str) -> Result<Arc<dyn OrdererClient>, RegistryError> {
        let entry = self.entry(name)?;
        match entry.client {
            NodeClient::Orderer(client) => Ok(client),
            _ => Err(Self::wrong_type(&entry, NodeType::Orderer)),
        }
    }

    fn ca_client(
        &self,
        name: &str,
    ) -> Result<Arc<dyn CertificateAuthorityTransport>, RegistryError> {
        let entry = self.entry(name)?;
        match entry.client {
            NodeClient::CertificateAuthority(client) => Ok(client),
            _ => Err(Self::wrong_type(&entry, NodeType::CertificateAuthority)),
        }
    }
}
