//! # Gateway Lifecycle
//!
//! Identity onboarding through the CA, connecting from a descriptor
//! directory, and teardown while a commit wait is pending, including a
//! wait bound to a channel that a later discovery pass replaced.

use std::fs;
use std::sync::Arc;

use super::fixtures::{ca, gateway, gateway_over, orderer, peer, within, CHANNEL, WALLET};

use cg_02_identity_context::WalletProvider;
use cg_03_channel_topology::ChannelTopologyApi;
use cg_04_certificate_authority::CertificateAuthorityApi;
use cg_05_transaction_orchestrator::{InvokeRequest, OrchestratorError, TransactionOrchestratorApi};
use cg_06_query_facade::QueryApi;
use gateway_runtime::{load_descriptor_dir, GatewayConfig};
use ledger_simnet::SimulatedNetwork;
use shared_bus::{EventFilter, EventTopic, GatewayEvent};
use shared_types::{Node, NodeType};

#[tokio::test]
async fn test_registered_user_signs_transactions() {
    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    network.add_ca_user("ca0", "admin", "adminpw");
    let t = gateway(&network);
    t.gateway
        .connect(vec![peer("peer0"), orderer("orderer0"), ca("ca0")])
        .await
        .unwrap();

    let secret = t
        .gateway
        .certificate_authority
        .register("ca0", "user1", "org1.department1")
        .await
        .unwrap();
    let identity = t
        .gateway
        .certificate_authority
        .enroll_into_wallet("ca0", "user1", &secret, WALLET, "user1", "Org1MSP")
        .await
        .unwrap();
    assert_eq!(identity.name, "user1");
    let wallet = t.gateway.wallets.wallet(WALLET).unwrap();
    assert!(wallet.exists("user1").await.unwrap());

    // Reconnect with the peer and orderer acting as the new user.
    t.gateway.disconnect().await;
    t.gateway
        .connect(vec![
            Node::peer("peer0", "grpc://peer0:7051", WALLET, "user1"),
            Node::orderer("orderer0", "grpc://orderer0:7050", WALLET, "user1"),
        ])
        .await
        .unwrap();

    within(t.gateway.orchestrator.submit_transaction(InvokeRequest::new(
        CHANNEL,
        "cc1",
        "move",
        Vec::new(),
    )))
    .await
    .unwrap();

    assert_eq!(network.proposals()[0].signer, "user1");
    assert_eq!(network.broadcasts()[0].signer, "user1");
}

#[tokio::test]
async fn test_connect_from_descriptor_directory() {
    let dir = tempfile::tempdir().unwrap();
    for (file, node) in [
        ("01-peer0.json", peer("peer0")),
        ("02-orderer0.json", orderer("orderer0")),
        ("03-ca0.json", ca("ca0")),
    ] {
        fs::write(dir.path().join(file), serde_json::to_string_pretty(&node).unwrap()).unwrap();
    }

    let nodes = load_descriptor_dir(dir.path()).unwrap();
    assert_eq!(nodes[0].node_type, NodeType::Peer);

    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    let t = gateway(&network);
    t.gateway.connect(nodes).await.unwrap();

    assert_eq!(t.gateway.queries.list_peer_names(), vec!["peer0"]);
    assert_eq!(t.gateway.queries.list_orderer_names(), vec!["orderer0"]);
    assert_eq!(t.gateway.queries.list_certificate_authority_names(), vec!["ca0"]);
    assert_eq!(
        t.gateway.queries.list_peers_in_channel(CHANNEL).await.unwrap(),
        vec!["peer0"]
    );
}

#[tokio::test]
async fn test_disconnect_cancels_pending_commit_wait() {
    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    network.withhold_commit_events(true);

    let mut config = GatewayConfig::default();
    config.orchestrator.commit_timeout_secs = None;
    let t = gateway_over(network.clone(), Arc::new(network.clone()), config);
    t.gateway
        .connect(vec![peer("peer0"), orderer("orderer0")])
        .await
        .unwrap();
    let mut runtime_events = t
        .gateway
        .subscribe(EventFilter::topics(vec![EventTopic::Runtime]));

    let orchestrator = t.gateway.orchestrator.clone();
    let pending = tokio::spawn(async move {
        orchestrator
            .submit_transaction(InvokeRequest::new(CHANNEL, "cc1", "move", Vec::new()))
            .await
    });

    let subscription = t
        .gateway
        .topology
        .current()
        .channel(CHANNEL)
        .and_then(|channel| channel.event_subscription("peer0"))
        .unwrap();
    within(async {
        while subscription.pending() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    t.gateway.disconnect().await;

    let err = within(pending).await.unwrap().unwrap_err();
    assert!(matches!(err, OrchestratorError::EventSubscription { .. }));
    assert_eq!(network.broadcasts_sent(), 1);
    assert!(matches!(
        runtime_events.try_recv(),
        Ok(Some(GatewayEvent::Disconnected))
    ));
}

#[tokio::test]
async fn test_disconnect_after_rediscovery_cancels_pending_commit_wait() {
    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    network.withhold_commit_events(true);

    let mut config = GatewayConfig::default();
    config.orchestrator.commit_timeout_secs = None;
    let t = gateway_over(network.clone(), Arc::new(network.clone()), config);
    t.gateway
        .connect(vec![peer("peer0"), orderer("orderer0")])
        .await
        .unwrap();

    let orchestrator = t.gateway.orchestrator.clone();
    let pending = tokio::spawn(async move {
        orchestrator
            .submit_transaction(InvokeRequest::new(CHANNEL, "cc1", "move", Vec::new()))
            .await
    });

    let bound = t
        .gateway
        .topology
        .current()
        .channel(CHANNEL)
        .and_then(|channel| channel.event_subscription("peer0"))
        .unwrap();
    within(async {
        while bound.pending() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    let rediscovered = t.gateway.topology.discover_all().await.unwrap();
    assert!(rediscovered.channel(CHANNEL).is_some());
    assert_eq!(bound.pending(), 1);

    t.gateway.disconnect().await;

    let err = within(pending).await.unwrap().unwrap_err();
    assert!(matches!(err, OrchestratorError::EventSubscription { .. }));
    assert_eq!(bound.pending(), 0);
}
