//! # Channel
//!
//! A discovered ledger channel: member peers, one commit-event subscription
//! per member, and the bound orderer.

use super::subscription::EventSubscription;
use serde::{Deserialize, Serialize};
use shared_types::{OrdererClient, PeerClient};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// How a channel's orderer was chosen.
///
/// Only single-orderer topologies are modelled: the first orderer in
/// registry load order is bound to every channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdererSelection {
    /// First orderer in registry load order.
    #[default]
    FirstRegistered,
}

impl OrdererSelection {
    /// Pick an orderer out of `candidates` (registry load order).
    pub fn select<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        match self {
            Self::FirstRegistered => candidates.first(),
        }
    }
}

/// The orderer a channel submits to.
#[derive(Clone)]
pub struct OrdererBinding {
    /// Orderer node name.
    pub name: String,
    /// Orderer client handle.
    pub client: Arc<dyn OrdererClient>,
    /// Rule that picked this orderer.
    pub selection: OrdererSelection,
}

impl fmt::Debug for OrdererBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrdererBinding")
            .field("name", &self.name)
            .field("selection", &self.selection)
            .finish()
    }
}

/// A discovered channel.
pub struct Channel {
    name: String,
    peers: BTreeMap<String, Arc<dyn PeerClient>>,
    event_subscriptions: BTreeMap<String, Arc<EventSubscription>>,
    orderer: OrdererBinding,
}

impl Channel {
    /// Build a channel over `members`, creating one (unconnected) event
    /// subscription per member.
    pub fn new(
        name: impl Into<String>,
        members: BTreeMap<String, Arc<dyn PeerClient>>,
        orderer: OrdererBinding,
    ) -> Self {
        let name = name.into();
        let event_subscriptions = members
            .iter()
            .map(|(peer, client)| {
                (
                    peer.clone(),
                    Arc::new(EventSubscription::new(&name, peer, Arc::clone(client))),
                )
            })
            .collect();

        Self {
            name,
            peers: members,
            event_subscriptions,
            orderer,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member peer names, sorted.
    pub fn peer_names(&self) -> Vec<String> {
        self.peers.keys().cloned().collect()
    }

    /// Member peer names as a set.
    pub fn peer_set(&self) -> BTreeSet<String> {
        self.peers.keys().cloned().collect()
    }

    /// Whether `peer` is a member.
    pub fn has_peer(&self, peer: &str) -> bool {
        self.peers.contains_key(peer)
    }

    /// Client for member `peer`.
    pub fn peer(&self, peer: &str) -> Option<Arc<dyn PeerClient>> {
        self.peers.get(peer).cloned()
    }

    /// Event subscription of member `peer`.
    pub fn event_subscription(&self, peer: &str) -> Option<Arc<EventSubscription>> {
        self.event_subscriptions.get(peer).cloned()
    }

    /// The peer transactions are endorsed on: the first member in sorted
    /// order, with its client and event subscription.
    pub fn representative(&self) -> Option<RepresentativePeer> {
        let (name, client) = self.peers.iter().next()?;
        let subscription = self.event_subscriptions.get(name)?;
        Some(RepresentativePeer {
            name: name.clone(),
            client: Arc::clone(client),
            subscription: Arc::clone(subscription),
        })
    }

    /// Bound orderer.
    pub fn orderer(&self) -> &OrdererBinding {
        &self.orderer
    }

    /// Disconnect every event subscription of the channel.
    pub fn disconnect(&self) {
        for subscription in self.event_subscriptions.values() {
            subscription.disconnect();
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("peers", &self.peer_names())
            .field("orderer", &self.orderer.name)
            .finish()
    }
}

/// The member peer a transaction runs against.
#[derive(Clone)]
pub struct RepresentativePeer {
    /// Peer name.
    pub name: String,
    /// Peer client.
    pub client: Arc<dyn PeerClient>,
    /// The peer's commit-event subscription on the channel.
    pub subscription: Arc<EventSubscription>,
}

impl fmt::Debug for RepresentativePeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepresentativePeer")
            .field("name", &self.name)
            .finish()
    }
}
