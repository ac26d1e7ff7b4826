//! # Topology Snapshot
//!
//! The result of one discovery pass. Snapshots are immutable and handed
//! out as `Arc`, so a transaction keeps a consistent view of its channel
//! while a later pass replaces the current snapshot.

use super::channel::Channel;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Versioned channel map.
#[derive(Debug, Default)]
pub struct TopologySnapshot {
    version: u64,
    channels: BTreeMap<String, Arc<Channel>>,
    peers_denied: Vec<String>,
}

impl TopologySnapshot {
    /// Create a snapshot.
    pub fn new(version: u64, channels: BTreeMap<String, Arc<Channel>>, peers_denied: Vec<String>) -> Self {
        Self {
            version,
            channels,
            peers_denied,
        }
    }

    /// Discovery pass that produced the snapshot (0 = nothing discovered yet).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Channel `name`.
    pub fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get(name).cloned()
    }

    /// Channel names, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Every channel, sorted by name.
    pub fn channels(&self) -> impl Iterator<Item = &Arc<Channel>> {
        self.channels.values()
    }

    /// Peers that denied access and contributed no channels.
    pub fn peers_denied(&self) -> &[String] {
        &self.peers_denied
    }

    /// Whether the snapshot holds no channel.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Disconnect every event subscription in the snapshot.
    pub fn disconnect(&self) {
        for channel in self.channels.values() {
            channel.disconnect();
        }
    }
}
