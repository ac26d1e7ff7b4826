//! Identity Context Service
//!
//! Resolves node → wallet → identity and binds the result to the node's
//! own signing context.

use crate::domain::{IdentityError, IdentityScope, NodeContext};
use crate::ports::inbound::IdentityContextApi;
use crate::ports::outbound::WalletProvider;
use async_trait::async_trait;
use cg_01_node_registry::NodeRegistryApi;
use parking_lot::{Mutex, RwLock};
use shared_bus::{EventPublisher, GatewayEvent, NoopPublisher};
use shared_types::{Node, SigningIdentity, WalletError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-node identity switching.
pub struct IdentityContextSwitcher {
    registry: Arc<dyn NodeRegistryApi>,
    wallets: Arc<dyn WalletProvider>,
    contexts: Mutex<HashMap<String, Arc<tokio::sync::Mutex<NodeContext>>>>,
    bound: RwLock<HashMap<String, SigningIdentity>>,
    publisher: Arc<dyn EventPublisher>,
}

impl IdentityContextSwitcher {
    /// Create a switcher over `registry` and `wallets`.
    pub fn new(registry: Arc<dyn NodeRegistryApi>, wallets: Arc<dyn WalletProvider>) -> Self {
        Self::with_publisher(registry, wallets, Arc::new(NoopPublisher))
    }

    /// Create a switcher that reports bindings on `publisher`.
    pub fn with_publisher(
        registry: Arc<dyn NodeRegistryApi>,
        wallets: Arc<dyn WalletProvider>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            wallets,
            contexts: Mutex::new(HashMap::new()),
            bound: RwLock::new(HashMap::new()),
            publisher,
        }
    }

    /// Forget every node context and binding.
    pub fn clear(&self) {
        self.contexts.lock().clear();
        self.bound.write().clear();
    }

    /// Number of identity switches performed on `node` so far.
    pub async fn switch_count(&self, node: &str) -> u64 {
        let context = self.contexts.lock().get(node).cloned();
        match context {
            Some(context) => context.lock().await.switches(),
            None => 0,
        }
    }

    fn context(&self, node: &str) -> Arc<tokio::sync::Mutex<NodeContext>> {
        self.contexts
            .lock()
            .entry(node.to_string())
            .or_default()
            .clone()
    }

    async fn resolve(&self, node: &Node) -> Result<SigningIdentity, IdentityError> {
        let wallet = self
            .wallets
            .wallet(&node.wallet)
            .ok_or_else(|| IdentityError::WalletNotFound {
                node: node.name.clone(),
                wallet: node.wallet.clone(),
            })?;

        let identity = wallet
            .get_identity(&node.identity)
            .await
            .map_err(|err| match err {
                WalletError::IdentityNotFound { wallet, name } => IdentityError::IdentityNotFound {
                    node: node.name.clone(),
                    wallet,
                    identity: name,
                },
                other => IdentityError::Wallet(other),
            })?;

        Ok(SigningIdentity::new(identity))
    }
}

#[async_trait]
impl IdentityContextApi for IdentityContextSwitcher {
    async fn use_identity(&self, node: &str) -> Result<SigningIdentity, IdentityError> {
        let scope = self.scope(node).await?;
        Ok(scope.identity().clone())
    }

    async fn scope(&self, node: &str) -> Result<IdentityScope, IdentityError> {
        let descriptor = self.registry.lookup(node)?;
        let mut guard = self.context(node).lock_owned().await;

        let identity = self.resolve(&descriptor).await?;
        let changed = guard.active.as_ref() != Some(&identity);
        guard.active = Some(identity.clone());
        guard.switches += 1;

        debug!(
            node,
            identity = %identity,
            fingerprint = %identity.short_fingerprint(),
            "Identity context switched"
        );

        if changed {
            self.bound
                .write()
                .insert(node.to_string(), identity.clone());
            info!(node, identity = %identity, "Identity bound");
            self.publisher
                .publish(GatewayEvent::IdentityBound {
                    node: node.to_string(),
                    identity: identity.name().to_string(),
                    msp_id: identity.msp_id().to_string(),
                })
                .await;
        }

        Ok(IdentityScope::new(node.to_string(), identity, guard))
    }

    fn active_identity(&self, node: &str) -> Option<SigningIdentity> {
        self.bound.read().get(node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryWallet, WalletDirectory};
    use cg_01_node_registry::NodeRegistry;
    use ledger_simnet::SimulatedNetwork;
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::Identity;
    use std::time::Duration;

    async fn switcher_with(bus: Arc<InMemoryEventBus>) -> IdentityContextSwitcher {
        let registry = Arc::new(NodeRegistry::new(Arc::new(SimulatedNetwork::new())));
        registry
            .load(vec![
                Node::peer("peer0", "grpc://localhost:7051", "org1", "peer-admin"),
                Node::peer("peer1", "grpc://localhost:8051", "org1", "peer-admin"),
                Node::certificate_authority("ca0", "http://localhost:7054", "org1", "ca-admin"),
                Node::orderer("orderer0", "grpc://localhost:7050", "missing", "admin"),
                Node::peer("peer9", "grpc://localhost:9051", "org1", "nobody"),
            ])
            .await
            .unwrap();

        let wallet = InMemoryWallet::new("org1")
            .with_identity(Identity::new("peer-admin", "cert-peer", "k1", "Org1MSP"))
            .with_identity(Identity::new("ca-admin", "cert-ca", "k2", "Org1MSP"));
        let wallets = Arc::new(WalletDirectory::new().with_wallet(Arc::new(wallet)));

        IdentityContextSwitcher::with_publisher(registry, wallets, bus)
    }

    async fn switcher() -> IdentityContextSwitcher {
        switcher_with(Arc::new(InMemoryEventBus::new())).await
    }

    #[tokio::test]
    async fn test_use_identity_binds_node_identity() {
        let switcher = switcher().await;

        let peer = switcher.use_identity("peer0").await.unwrap();
        let ca = switcher.use_identity("ca0").await.unwrap();

        assert_eq!(peer.name(), "peer-admin");
        assert_eq!(ca.name(), "ca-admin");
        assert_eq!(switcher.active_identity("peer0"), Some(peer));
        assert!(switcher.active_identity("peer1").is_none());
    }

    #[tokio::test]
    async fn test_unknown_node_is_not_found() {
        let switcher = switcher().await;
        let err = switcher.use_identity("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_wallet_and_identity() {
        let switcher = switcher().await;

        let err = switcher.use_identity("orderer0").await.unwrap_err();
        assert!(matches!(err, IdentityError::WalletNotFound { wallet, .. } if wallet == "missing"));

        let err = switcher.use_identity("peer9").await.unwrap_err();
        assert!(
            matches!(err, IdentityError::IdentityNotFound { identity, .. } if identity == "nobody")
        );
    }

    #[tokio::test]
    async fn test_scopes_on_same_node_serialize() {
        let switcher = Arc::new(switcher().await);
        let first = switcher.scope("peer0").await.unwrap();

        let contender = {
            let switcher = switcher.clone();
            tokio::spawn(async move { switcher.scope("peer0").await.map(|s| s.node().to_string()) })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(first);
        let node = tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(node, "peer0");
        assert_eq!(switcher.switch_count("peer0").await, 2);
    }

    #[tokio::test]
    async fn test_scopes_on_different_nodes_do_not_contend() {
        let switcher = switcher().await;
        let _peer0 = switcher.scope("peer0").await.unwrap();

        let peer1 = tokio::time::timeout(Duration::from_secs(1), switcher.scope("peer1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(peer1.identity().name(), "peer-admin");
    }

    #[tokio::test]
    async fn test_binding_is_published_once_per_change() {
        let bus = Arc::new(InMemoryEventBus::new());
        let switcher = switcher_with(bus.clone()).await;
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Identity]));

        switcher.use_identity("peer0").await.unwrap();
        switcher.use_identity("peer0").await.unwrap();

        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            GatewayEvent::IdentityBound { node, msp_id, .. } if node == "peer0" && msp_id == "Org1MSP"
        ));
    }

    #[tokio::test]
    async fn test_clear_forgets_bindings() {
        let switcher = switcher().await;
        switcher.use_identity("peer0").await.unwrap();
        switcher.clear();
        assert!(switcher.active_identity("peer0").is_none());
        assert_eq!(switcher.switch_count("peer0").await, 0);
    }
}
