//! Inbound Ports (Driving Ports / API)

use crate::domain::{Channel, TopologyError, TopologySnapshot};
use async_trait::async_trait;
use std::sync::Arc;

/// Channel topology API.
#[async_trait]
pub trait ChannelTopologyApi: Send + Sync {
    /// Discover channels through `peers` and make the result current.
    async fn discover(&self, peers: &[String]) -> Result<Arc<TopologySnapshot>, TopologyError>;

    /// Discover channels through every registered peer.
    async fn discover_all(&self) -> Result<Arc<TopologySnapshot>, TopologyError>;

    /// Current snapshot.
    fn current(&self) -> Arc<TopologySnapshot>;

    /// Channel `name` from the current snapshot.
    fn channel(&self, name: &str) -> Result<Arc<Channel>, TopologyError>;

    /// Channel `name`, running a discovery pass first if it is unknown.
    async fn channel_or_discover(&self, name: &str) -> Result<Arc<Channel>, TopologyError>;

    /// Tear down every event subscription and drop the current snapshot.
    fn disconnect(&self);
}
