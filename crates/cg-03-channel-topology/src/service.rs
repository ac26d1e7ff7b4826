//! Channel Topology Service
//!
//! Discovery pass:
//!
//! 1. For every peer, concurrently: take the peer's identity scope and ask
//!    the peer which channels it joined.
//! 2. Access-denied peers contribute nothing; any other failure aborts.
//! 3. Union the answers into channel → sorted member set.
//! 4. Bind the selected orderer and one event subscription per member.
//! 5. Publish the result as a new snapshot version.
//!
//! Channels of a replaced snapshot stay tracked until nothing holds them,
//! so teardown still reaches transactions that bound to an older version.

use crate::config::TopologyConfig;
use crate::domain::{Channel, OrdererBinding, TopologyError, TopologySnapshot};
use crate::ports::inbound::ChannelTopologyApi;
use async_trait::async_trait;
use cg_01_node_registry::NodeRegistryApi;
use cg_02_identity_context::IdentityContextApi;
use futures::future::try_join_all;
use parking_lot::{Mutex, RwLock};
use shared_bus::{EventPublisher, GatewayEvent, NoopPublisher};
use shared_types::{NodeType, PeerClient};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// What one peer reported during discovery.
struct PeerReport {
    peer: String,
    client: Arc<dyn PeerClient>,
    /// `None` when the peer denied access.
    channels: Option<Vec<String>>,
}

/// Builds and holds the channel topology.
pub struct ChannelTopologyBuilder {
    registry: Arc<dyn NodeRegistryApi>,
    identities: Arc<dyn IdentityContextApi>,
    config: TopologyConfig,
    current: RwLock<Arc<TopologySnapshot>>,
    versions: AtomicU64,
    /// Channels of replaced snapshots that may still carry commit waits.
    superseded: Mutex<Vec<Weak<Channel>>>,
    publisher: Arc<dyn EventPublisher>,
}

impl ChannelTopologyBuilder {
    /// Create a builder with the default configuration.
    pub fn new(registry: Arc<dyn NodeRegistryApi>, identities: Arc<dyn IdentityContextApi>) -> Self {
        Self::with_config(registry, identities, TopologyConfig::default(), Arc::new(NoopPublisher))
    }

    /// Create a builder with explicit configuration and publisher.
    pub fn with_config(
        registry: Arc<dyn NodeRegistryApi>,
        identities: Arc<dyn IdentityContextApi>,
        config: TopologyConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            identities,
            config,
            current: RwLock::new(Arc::new(TopologySnapshot::default())),
            versions: AtomicU64::new(0),
            superseded: Mutex::new(Vec::new()),
            publisher,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Channel names of the current snapshot, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        self.current().channel_names()
    }

    /// Sorted member peers of `channel`.
    pub fn peers_in_channel(&self, channel: &str) -> Result<Vec<String>, TopologyError> {
        self.channel(channel).map(|channel| channel.peer_names())
    }

    async fn query_peer(&self, peer: &str) -> Result<PeerReport, TopologyError> {
        let client = self.registry.peer_client(peer)?;
        let scope = self.identities.scope(peer).await?;

        match client.query_channels(scope.identity()).await {
            Ok(channels) => {
                debug!(peer, channels = channels.len(), "Peer reported channels");
                Ok(PeerReport {
                    peer: peer.to_string(),
                    client,
                    channels: Some(channels),
                })
            }
            Err(err) if err.is_access_denied() => {
                warn!(peer, error = %err, "Peer denied channel query, skipping");
                Ok(PeerReport {
                    peer: peer.to_string(),
                    client,
                    channels: None,
                })
            }
            Err(source) => Err(TopologyError::Peer {
                peer: peer.to_string(),
                source,
            }),
        }
    }

    fn bind_orderer(&self, channel: &str) -> Result<OrdererBinding, TopologyError> {
        let orderers = self.registry.names(NodeType::Orderer);
        let selection = self.config.orderer_selection;
        let name = selection
            .select(&orderers)
            .ok_or_else(|| TopologyError::NoOrderer {
                channel: channel.to_string(),
            })?;

        Ok(OrdererBinding {
            name: name.clone(),
            client: self.registry.orderer_client(name)?,
            selection,
        })
    }

    /// Number of replaced channels still held by someone.
    pub fn superseded_channels(&self) -> usize {
        self.superseded
            .lock()
            .iter()
            .filter(|channel| channel.strong_count() > 0)
            .count()
    }

    fn retire(&self, previous: &TopologySnapshot) {
        let mut superseded = self.superseded.lock();
        superseded.retain(|channel| channel.strong_count() > 0);
        superseded.extend(previous.channels().map(Arc::downgrade));
    }
}

#[async_trait]
impl ChannelTopologyApi for ChannelTopologyBuilder {
    async fn discover(&self, peers: &[String]) -> Result<Arc<TopologySnapshot>, TopologyError> {
        let unique: BTreeSet<&String> = peers.iter().collect();
        let reports = try_join_all(unique.into_iter().map(|peer| self.query_peer(peer))).await?;

        let mut membership: BTreeMap<String, BTreeMap<String, Arc<dyn PeerClient>>> = BTreeMap::new();
        let mut denied = Vec::new();
        for report in reports {
            let Some(channels) = report.channels else {
                denied.push(report.peer);
                continue;
            };
            for channel in channels {
                membership
                    .entry(channel)
                    .or_default()
                    .insert(report.peer.clone(), Arc::clone(&report.client));
            }
        }

        let mut channels = BTreeMap::new();
        if let Some(first) = membership.keys().next().cloned() {
            let orderer = self.bind_orderer(&first)?;
            for (name, members) in membership {
                let channel = Channel::new(name.clone(), members, orderer.clone());
                channels.insert(name, Arc::new(channel));
            }
        }

        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(TopologySnapshot::new(version, channels, denied));
        {
            let mut current = self.current.write();
            self.retire(&current);
            *current = Arc::clone(&snapshot);
        }

        info!(
            version,
            channels = ?snapshot.channel_names(),
            peers_denied = ?snapshot.peers_denied(),
            "Channel topology discovered"
        );
        self.publisher
            .publish(GatewayEvent::TopologyDiscovered {
                version,
                channels: snapshot.channel_names(),
                peers_denied: snapshot.peers_denied().to_vec(),
            })
            .await;

        Ok(snapshot)
    }

    async fn discover_all(&self) -> Result<Arc<TopologySnapshot>, TopologyError> {
        let peers = self.registry.names(NodeType::Peer);
        self.discover(&peers).await
    }

    fn current(&self) -> Arc<TopologySnapshot> {
        self.current.read().clone()
    }

    fn channel(&self, name: &str) -> Result<Arc<Channel>, TopologyError> {
        self.current()
            .channel(name)
            .ok_or_else(|| TopologyError::ChannelNotFound(name.to_string()))
    }

    async fn channel_or_discover(&self, name: &str) -> Result<Arc<Channel>, TopologyError> {
        if let Some(channel) = self.current().channel(name) {
            return Ok(channel);
        }
        if !self.config.discover_on_demand {
            return Err(TopologyError::ChannelNotFound(name.to_string()));
        }

        debug!(channel = name, "Channel unknown, running discovery");
        self.discover_all()
            .await?
            .channel(name)
            .ok_or_else(|| TopologyError::ChannelNotFound(name.to_string()))
    }

    fn disconnect(&self) {
        let (previous, superseded) = {
            let mut current = self.current.write();
            (std::mem::take(&mut *current), std::mem::take(&mut *self.superseded.lock()))
        };
        previous.disconnect();

        let mut retired = 0;
        for channel in superseded.iter().filter_map(Weak::upgrade) {
            channel.disconnect();
            retired += 1;
        }
        info!(
            version = previous.version(),
            retired,
            "Channel topology disconnected"
        );
    }
}
