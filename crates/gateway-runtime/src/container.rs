//! # Gateway Container
//!
//! Explicitly constructed context object holding every subsystem instance.
//! There is no global state: two containers built over two networks are
//! fully independent.
//!
//! ## Construction Order
//!
//! ```text
//! Level 0: event bus, wallet directory
//! Level 1: Node Registry (cg-01)
//! Level 2: Identity Context (cg-02)
//! Level 3: Channel Topology (cg-03), Certificate Authority (cg-04)
//! Level 4: Transaction Orchestrator (cg-05), Query Facade (cg-06)
//! ```
//!
//! Every subsystem that reports state changes publishes on the same
//! `InMemoryEventBus`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gateway_telemetry::log_event;
use thiserror::Error;
use tracing::{info, instrument};

use shared_bus::{EventFilter, EventPublisher, GatewayEvent, InMemoryEventBus, Subscription};
use shared_types::{Node, NodeClientFactory};

use cg_01_node_registry::{NodeRegistry, NodeRegistryApi, RegistryError};
use cg_02_identity_context::{IdentityContextSwitcher, WalletDirectory};
use cg_03_channel_topology::{
    ChannelTopologyApi, ChannelTopologyBuilder, TopologyError, TopologySnapshot,
};
use cg_04_certificate_authority::CertificateAuthorityService;
use cg_05_transaction_orchestrator::TransactionOrchestrator;
use cg_06_query_facade::QueryFacade;

use crate::config::GatewayConfig;

/// Errors raised while connecting the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The node descriptors could not be loaded into the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Channel discovery failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Central container holding all subsystem instances.
pub struct GatewayContainer {
    /// Configuration the container was built with.
    pub config: GatewayConfig,

    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Notification channel every subsystem publishes on.
    pub event_bus: Arc<InMemoryEventBus>,
    /// Named wallets the identity switcher and CA service resolve against.
    pub wallets: Arc<WalletDirectory>,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Node Registry (cg-01)
    pub registry: Arc<NodeRegistry>,
    /// Identity Context Switcher (cg-02)
    pub identities: Arc<IdentityContextSwitcher>,
    /// Channel Topology Builder (cg-03)
    pub topology: Arc<ChannelTopologyBuilder>,
    /// Certificate Authority client (cg-04)
    pub certificate_authority: Arc<CertificateAuthorityService>,
    /// Transaction Orchestrator (cg-05)
    pub orchestrator: Arc<TransactionOrchestrator>,
    /// Query Facade (cg-06)
    pub queries: Arc<QueryFacade>,

    busy: AtomicBool,
}

impl GatewayContainer {
    /// Build every subsystem over `factory` and `wallets`.
    #[instrument(skip_all)]
    pub fn new(
        config: GatewayConfig,
        factory: Arc<dyn NodeClientFactory>,
        wallets: Arc<WalletDirectory>,
    ) -> Self {
        info!("Initializing gateway subsystems");

        let event_bus = Arc::new(InMemoryEventBus::new());
        let publisher: Arc<dyn EventPublisher> = event_bus.clone();

        let registry = Arc::new(NodeRegistry::with_publisher(factory, publisher.clone()));
        let identities = Arc::new(IdentityContextSwitcher::with_publisher(
            registry.clone(),
            wallets.clone(),
            publisher.clone(),
        ));
        let topology = Arc::new(ChannelTopologyBuilder::with_config(
            registry.clone(),
            identities.clone(),
            config.topology.clone(),
            publisher.clone(),
        ));
        let certificate_authority = Arc::new(CertificateAuthorityService::with_publisher(
            registry.clone(),
            identities.clone(),
            wallets.clone(),
            publisher.clone(),
        ));
        let orchestrator = Arc::new(TransactionOrchestrator::with_config(
            registry.clone(),
            identities.clone(),
            topology.clone(),
            config.orchestrator.clone(),
            publisher,
        ));
        let queries = Arc::new(QueryFacade::new(
            registry.clone(),
            identities.clone(),
            topology.clone(),
        ));

        info!("Gateway subsystems initialized");

        Self {
            config,
            event_bus,
            wallets,
            registry,
            identities,
            topology,
            certificate_authority,
            orchestrator,
            queries,
            busy: AtomicBool::new(false),
        }
    }

    /// Subscribe to gateway events.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.event_bus.subscribe(filter)
    }

    /// Whether a connect is in progress.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    async fn set_busy(&self, busy: bool, reason: &str) {
        self.busy.store(busy, Ordering::Release);
        self.event_bus
            .publish(GatewayEvent::GatewayBusy {
                busy,
                reason: reason.to_string(),
            })
            .await;
    }

    /// Load `nodes` into the registry and discover channels over every peer.
    ///
    /// Publishes `GatewayBusy` around the work, on failure too. A failed
    /// load leaves the previous registry state in place.
    #[instrument(skip_all, fields(nodes = nodes.len()))]
    pub async fn connect(&self, nodes: Vec<Node>) -> Result<Arc<TopologySnapshot>, GatewayError> {
        self.set_busy(true, "connect").await;
        let result = self.load_and_discover(nodes).await;
        self.set_busy(false, "connect").await;

        match &result {
            Ok(snapshot) => log_event!(
                info,
                "runtime",
                "Gateway connected",
                version = snapshot.version(),
                channels = ?snapshot.channel_names()
            ),
            Err(e) => log_event!(warn, "runtime", "Gateway connect failed", error = %e),
        }
        result
    }

    async fn load_and_discover(&self, nodes: Vec<Node>) -> Result<Arc<TopologySnapshot>, GatewayError> {
        self.registry.load(nodes).await?;
        Ok(self.topology.discover_all().await?)
    }

    /// Tear down event subscriptions, forget identities and nodes.
    ///
    /// Pending commit waits resolve with a cancellation failure.
    pub async fn disconnect(&self) {
        self.topology.disconnect();
        self.identities.clear();
        self.registry.clear();
        self.event_bus.publish(GatewayEvent::Disconnected).await;
        log_event!(info, "runtime", "Gateway disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_02_identity_context::InMemoryWallet;
    use cg_05_transaction_orchestrator::{InvokeRequest, TransactionOrchestratorApi};
    use cg_06_query_facade::QueryApi;
    use ledger_simnet::SimulatedNetwork;
    use shared_bus::EventTopic;
    use shared_types::{ChaincodeInfo, Identity, TransactionState};

    fn container(network: &SimulatedNetwork) -> GatewayContainer {
        let wallets = WalletDirectory::new().with_wallet(Arc::new(
            InMemoryWallet::new("org1").with_identity(Identity::new("admin", "cert", "key", "Org1MSP")),
        ));
        GatewayContainer::new(
            GatewayConfig::default(),
            Arc::new(network.clone()),
            Arc::new(wallets),
        )
    }

    fn nodes() -> Vec<Node> {
        vec![
            Node::peer("peer0", "grpc://peer0:7051", "org1", "admin"),
            Node::orderer("orderer0", "grpc://orderer0:7050", "org1", "admin"),
        ]
    }

    #[tokio::test]
    async fn test_connect_discovers_and_reports_busy() {
        let network = SimulatedNetwork::new();
        network.join_channel("peer0", "mychannel");
        let gateway = container(&network);
        let mut runtime_events = gateway.subscribe(EventFilter::topics(vec![EventTopic::Runtime]));

        let snapshot = gateway.connect(nodes()).await.unwrap();
        assert_eq!(snapshot.channel_names(), vec!["mychannel"]);
        assert!(!gateway.is_busy());

        let busy: Vec<bool> = runtime_events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                GatewayEvent::GatewayBusy { busy, .. } => Some(busy),
                _ => None,
            })
            .collect();
        assert_eq!(busy, vec![true, false]);
    }

    #[tokio::test]
    async fn test_failed_connect_clears_busy() {
        let network = SimulatedNetwork::new();
        let gateway = container(&network);

        let mut duplicated = nodes();
        duplicated.push(Node::peer("peer0", "grpc://other:7051", "org1", "admin"));

        let err = gateway.connect(duplicated).await.unwrap_err();
        assert!(matches!(err, GatewayError::Registry(RegistryError::DuplicateNode(_))));
        assert!(!gateway.is_busy());
        assert!(gateway.registry.is_empty());
    }

    #[tokio::test]
    async fn test_subsystems_share_one_context() {
        let network = SimulatedNetwork::new();
        network.join_channel("peer0", "mychannel");
        network.install("peer0", ChaincodeInfo::new("cc1", "1.0"));
        let gateway = container(&network);
        gateway.connect(nodes()).await.unwrap();

        assert_eq!(gateway.queries.list_peer_names(), vec!["peer0"]);
        assert_eq!(
            gateway.queries.list_installed_chaincode("peer0").await.unwrap()["cc1"],
            vec!["1.0"]
        );

        let mut tx_events = gateway.subscribe(EventFilter::topics(vec![EventTopic::Transaction]));
        network.instantiate("mychannel", ChaincodeInfo::new("cc1", "1.0"));
        gateway
            .orchestrator
            .submit_transaction(InvokeRequest::new("mychannel", "cc1", "put", vec!["a".into()]))
            .await
            .unwrap();

        let completed = tx_events
            .drain()
            .into_iter()
            .any(|event| matches!(event, GatewayEvent::TransactionCompleted { state: TransactionState::Committed, .. }));
        assert!(completed);
    }

    #[tokio::test]
    async fn test_disconnect_forgets_everything() {
        let network = SimulatedNetwork::new();
        network.join_channel("peer0", "mychannel");
        let gateway = container(&network);
        gateway.connect(nodes()).await.unwrap();
        let mut runtime_events = gateway.subscribe(EventFilter::topics(vec![EventTopic::Runtime]));

        gateway.disconnect().await;

        assert!(gateway.registry.is_empty());
        assert!(gateway.topology.current().is_empty());
        assert!(matches!(runtime_events.try_recv(), Ok(Some(GatewayEvent::Disconnected))));
    }
}
