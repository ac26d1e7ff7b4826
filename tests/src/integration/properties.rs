//! # Gateway Guarantees
//!
//! Registry lookup, discovery idempotence, precondition checks and the
//! endorse -> order -> commit ordering rules, observed across subsystems.

use std::sync::Arc;

use async_trait::async_trait;

use super::fixtures::{connected_single_peer, gateway, gateway_over, orderer, peer, within, CHANNEL};

use cg_01_node_registry::{NodeRegistryApi, RegistryError};
use cg_03_channel_topology::ChannelTopologyApi;
use cg_05_transaction_orchestrator::{
    ChaincodeDeployment, InvokeRequest, OrchestratorError, TransactionOrchestratorApi,
};
use cg_06_query_facade::QueryApi;
use gateway_runtime::GatewayConfig;
use ledger_simnet::SimulatedNetwork;
use shared_bus::{EventFilter, EventTopic, GatewayEvent};
use shared_types::{
    BroadcastRequest, BroadcastResponse, ChaincodeInfo, Node, NodeClient, NodeClientFactory,
    OrdererClient, ProposalResponse, SigningIdentity, TransactionState, TransportError,
};

/// Orderer stub that fails the test if anything is broadcast to it.
struct NoBroadcastOrderer {
    name: String,
}

#[async_trait]
impl OrdererClient for NoBroadcastOrderer {
    fn node_name(&self) -> &str {
        &self.name
    }

    async fn broadcast(
        &self,
        _signer: &SigningIdentity,
        request: &BroadcastRequest,
    ) -> Result<BroadcastResponse, TransportError> {
        panic!("transaction {} reached orderer {}", request.tx_id, self.name);
    }
}

/// Simulated peers, but every orderer refuses to be used.
struct NoOrderingNetwork {
    network: SimulatedNetwork,
}

impl NodeClientFactory for NoOrderingNetwork {
    fn connect(&self, node: &Node) -> Result<NodeClient, TransportError> {
        match self.network.connect(node)? {
            NodeClient::Orderer(_) => Ok(NodeClient::Orderer(Arc::new(NoBroadcastOrderer {
                name: node.name.clone(),
            }))),
            client => Ok(client),
        }
    }
}

#[tokio::test]
async fn test_lookup_returns_exactly_the_loaded_node() {
    let t = connected_single_peer().await;

    for node in [peer("peer0"), orderer("orderer0")] {
        assert_eq!(t.gateway.registry.lookup(&node.name).unwrap(), node);
    }
    assert!(matches!(
        t.gateway.registry.lookup("peer9"),
        Err(RegistryError::NodeNotFound(name)) if name == "peer9"
    ));
}

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let network = SimulatedNetwork::new();
    for p in ["peer2", "peer0", "peer1"] {
        network.join_channel(p, CHANNEL);
    }
    network.join_channel("peer1", "audit");
    let t = gateway(&network);

    let first = t
        .gateway
        .connect(vec![peer("peer2"), peer("peer0"), peer("peer1"), orderer("orderer0")])
        .await
        .unwrap();
    let second = t.gateway.topology.discover_all().await.unwrap();

    assert!(second.version() > first.version());
    assert_eq!(first.channel_names(), second.channel_names());
    for name in first.channel_names() {
        assert_eq!(
            first.channel(&name).unwrap().peer_names(),
            second.channel(&name).unwrap().peer_names()
        );
    }
    assert_eq!(
        second.channel(CHANNEL).unwrap().peer_names(),
        vec!["peer0", "peer1", "peer2"]
    );
}

#[tokio::test]
async fn test_denied_peer_is_absorbed_by_discovery_only() {
    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    network.join_channel("peer1", CHANNEL);
    network.install("peer1", ChaincodeInfo::new("cc1", "1.0"));
    network.deny_access("peer1");
    let t = gateway(&network);

    let snapshot = t
        .gateway
        .connect(vec![peer("peer0"), peer("peer1"), orderer("orderer0")])
        .await
        .unwrap();
    assert_eq!(snapshot.channel(CHANNEL).unwrap().peer_names(), vec!["peer0"]);
    assert_eq!(snapshot.peers_denied(), ["peer1".to_string()]);

    // Informational listing degrades to empty.
    assert!(t
        .gateway
        .queries
        .list_installed_chaincode("peer1")
        .await
        .unwrap()
        .is_empty());
    // Everything else surfaces the denial.
    assert!(t.gateway.queries.list_channels_for_peer("peer1").await.is_err());
}

#[tokio::test]
async fn test_instantiate_existing_chaincode_sends_nothing() {
    let t = connected_single_peer().await;
    t.network.instantiate(CHANNEL, ChaincodeInfo::new("X", "1"));

    let err = t
        .gateway
        .orchestrator
        .instantiate_chaincode(ChaincodeDeployment::new("X", "1", CHANNEL, "init", Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::AlreadyInstantiated { .. }));
    assert_eq!(t.network.proposals_sent(), 0);
}

#[tokio::test]
async fn test_upgrade_missing_chaincode_sends_nothing() {
    let t = connected_single_peer().await;

    let err = t
        .gateway
        .orchestrator
        .upgrade_chaincode(ChaincodeDeployment::new("X", "2", CHANNEL, "init", Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::NotInstantiated { .. }));
    assert_eq!(t.network.proposals_sent(), 0);
}

#[tokio::test]
async fn test_failed_endorsement_never_reaches_ordering() {
    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    network.set_endorsement(
        "peer0",
        Ok(ProposalResponse::failure("peer0", 500, "chaincode returned an error")),
    );
    let t = gateway_over(
        network.clone(),
        Arc::new(NoOrderingNetwork { network }),
        GatewayConfig::default(),
    );
    t.gateway
        .connect(vec![peer("peer0"), orderer("orderer0")])
        .await
        .unwrap();

    let err = within(t.gateway.orchestrator.submit_transaction(InvokeRequest::new(
        CHANNEL,
        "cc1",
        "move",
        Vec::new(),
    )))
    .await
    .unwrap_err();

    assert!(matches!(err, OrchestratorError::Endorsement { .. }));
    assert!(err.to_string().contains("chaincode returned an error"));
}

#[tokio::test]
async fn test_rejected_ordering_never_commits() {
    let t = connected_single_peer().await;
    t.network
        .set_broadcast_status("orderer0", "SERVICE_UNAVAILABLE", "no leader");
    t.network.emit_event_on_rejected_broadcast(true);
    let mut events = t
        .gateway
        .subscribe(EventFilter::topics(vec![EventTopic::Transaction]));

    let err = within(t.gateway.orchestrator.submit_transaction(InvokeRequest::new(
        CHANNEL,
        "cc1",
        "move",
        Vec::new(),
    )))
    .await
    .unwrap_err();
    let OrchestratorError::Ordering { tx_id, .. } = err else {
        panic!("expected an ordering failure, got {err}");
    };

    // The late commit event arrives after the call already failed.
    t.network.emit_commit_event(CHANNEL, &tx_id, "VALID");
    tokio::task::yield_now().await;

    let committed = events.drain().into_iter().any(|event| {
        matches!(
            event,
            GatewayEvent::TransactionStateChanged { to: TransactionState::Committed, .. }
                | GatewayEvent::TransactionCompleted { state: TransactionState::Committed, .. }
        )
    });
    assert!(!committed);
}

#[tokio::test]
async fn test_invalid_commit_surfaces_validation_code() {
    let t = connected_single_peer().await;
    t.network.set_validation_code("MVCC_READ_CONFLICT");

    let err = within(t.gateway.orchestrator.submit_transaction(InvokeRequest::new(
        CHANNEL,
        "cc1",
        "move",
        Vec::new(),
    )))
    .await
    .unwrap_err();

    assert!(matches!(
        &err,
        OrchestratorError::CommitValidation { validation_code, .. } if validation_code == "MVCC_READ_CONFLICT"
    ));
}
