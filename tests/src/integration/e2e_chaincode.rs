//! # End-to-End Chaincode Flow
//!
//! `peer0` + `orderer0` on `mychannel`: install, instantiate, invoke,
//! evaluate and read the result back through the query facade.

use super::fixtures::{connected_single_peer, within, CHANNEL};

use cg_03_channel_topology::ChannelTopologyApi;
use cg_05_transaction_orchestrator::{
    ChaincodeDeployment, ChaincodePackage, InvokeRequest, TransactionOrchestratorApi,
    TransactionOutput,
};
use cg_06_query_facade::QueryApi;
use shared_bus::{EventFilter, EventTopic, GatewayEvent};
use shared_types::{ChaincodeInfo, ProposalKind, TransactionState};

#[tokio::test]
async fn test_discovery_binds_peer_and_orderer() {
    let t = connected_single_peer().await;

    let channel = t.gateway.topology.current().channel(CHANNEL).unwrap();
    assert_eq!(channel.peer_names(), vec!["peer0"]);
    assert_eq!(channel.orderer().name, "orderer0");
}

#[tokio::test]
async fn test_install_then_instantiate_returns_endorsement_payload() {
    let t = connected_single_peer().await;
    t.network.set_chaincode_response("cc1", "init", b"cc1 ready");
    let mut events = t
        .gateway
        .subscribe(EventFilter::topics(vec![EventTopic::Transaction]));

    within(
        t.gateway
            .orchestrator
            .install_chaincode(ChaincodePackage::new("cc1", "1.0", b"package".to_vec()), "peer0"),
    )
    .await
    .unwrap();

    let output = within(t.gateway.orchestrator.instantiate_chaincode(ChaincodeDeployment::new(
        "cc1",
        "1.0",
        CHANNEL,
        "init",
        Vec::new(),
    )))
    .await
    .unwrap();
    assert_eq!(output, TransactionOutput::Payload(b"cc1 ready".to_vec()));

    let states: Vec<TransactionState> = events
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            GatewayEvent::TransactionStateChanged { to, .. } => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            TransactionState::Endorsing,
            TransactionState::Endorsed,
            TransactionState::Ordering,
            TransactionState::AwaitingCommit,
            TransactionState::Committed,
        ]
    );

    let kinds: Vec<ProposalKind> = t.network.proposals().iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![ProposalKind::Install, ProposalKind::Instantiate]);
    assert_eq!(t.network.broadcasts_sent(), 1);

    assert_eq!(
        t.gateway.queries.list_instantiated_chaincode(CHANNEL).await.unwrap(),
        vec![ChaincodeInfo::new("cc1", "1.0")]
    );
    assert_eq!(
        t.gateway.queries.list_installed_chaincode("peer0").await.unwrap()["cc1"],
        vec!["1.0"]
    );
}

#[tokio::test]
async fn test_invoke_and_evaluate_after_instantiate() {
    let t = connected_single_peer().await;
    within(t.gateway.orchestrator.instantiate_chaincode(ChaincodeDeployment::new(
        "cc1",
        "1.0",
        CHANNEL,
        "init",
        Vec::new(),
    )))
    .await
    .unwrap();

    t.network.set_chaincode_response("cc1", "query", b"90");
    let submitted = within(t.gateway.orchestrator.submit_transaction(InvokeRequest::new(
        CHANNEL,
        "cc1",
        "move",
        vec!["a".into(), "b".into(), "10".into()],
    )))
    .await
    .unwrap();
    assert!(submitted.is_no_result());

    let evaluated = t
        .gateway
        .orchestrator
        .evaluate_transaction(InvokeRequest::new(CHANNEL, "cc1", "query", vec!["a".into()]))
        .await
        .unwrap();
    assert_eq!(evaluated.payload(), Some(&b"90"[..]));

    // Only the two submitted transactions were ordered.
    assert_eq!(t.network.broadcasts_sent(), 2);
}

#[tokio::test]
async fn test_upgrade_replaces_instantiated_version() {
    let t = connected_single_peer().await;
    t.network.instantiate(CHANNEL, ChaincodeInfo::new("cc1", "1.0"));

    within(t.gateway.orchestrator.upgrade_chaincode(
        ChaincodeDeployment::new("cc1", "1.1", CHANNEL, "init", Vec::new())
            .with_endorsement_policy("OR('Org1MSP.member')"),
    ))
    .await
    .unwrap();

    assert_eq!(
        t.gateway.queries.list_instantiated_chaincode(CHANNEL).await.unwrap(),
        vec![ChaincodeInfo::new("cc1", "1.1")]
    );
}
