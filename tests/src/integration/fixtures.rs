//! Shared wiring for the integration scenarios.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cg_02_identity_context::{InMemoryWallet, WalletDirectory};
use gateway_runtime::{GatewayConfig, GatewayContainer};
use ledger_simnet::SimulatedNetwork;
use shared_types::{Identity, Node, NodeClientFactory};

pub const CHANNEL: &str = "mychannel";
pub const WALLET: &str = "org1";

/// A gateway wired over a simulated network.
pub struct TestGateway {
    pub network: SimulatedNetwork,
    pub gateway: GatewayContainer,
}

pub fn wallets() -> WalletDirectory {
    WalletDirectory::new().with_wallet(Arc::new(
        InMemoryWallet::new(WALLET)
            .with_identity(Identity::new("admin", "cert-admin", "key-admin", "Org1MSP")),
    ))
}

pub fn peer(name: &str) -> Node {
    Node::peer(name, format!("grpc://{name}:7051"), WALLET, "admin").with_msp_id("Org1MSP")
}

pub fn orderer(name: &str) -> Node {
    Node::orderer(name, format!("grpc://{name}:7050"), WALLET, "admin")
}

pub fn ca(name: &str) -> Node {
    Node::certificate_authority(name, format!("http://{name}:7054"), WALLET, "admin")
}

/// Build a gateway over `factory`; the network handle is kept for scripting.
pub fn gateway_over(
    network: SimulatedNetwork,
    factory: Arc<dyn NodeClientFactory>,
    config: GatewayConfig,
) -> TestGateway {
    TestGateway {
        gateway: GatewayContainer::new(config, factory, Arc::new(wallets())),
        network,
    }
}

/// Gateway over the plain simulated network with default configuration.
pub fn gateway(network: &SimulatedNetwork) -> TestGateway {
    gateway_over(network.clone(), Arc::new(network.clone()), GatewayConfig::default())
}

/// One peer `peer0` on `mychannel` and one orderer `orderer0`, connected.
pub async fn connected_single_peer() -> TestGateway {
    let network = SimulatedNetwork::new();
    network.join_channel("peer0", CHANNEL);
    let t = gateway(&network);
    t.gateway
        .connect(vec![peer("peer0"), orderer("orderer0")])
        .await
        .unwrap();
    t
}

/// Bound a wait so a hung scenario fails instead of stalling the suite.
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .unwrap()
}
