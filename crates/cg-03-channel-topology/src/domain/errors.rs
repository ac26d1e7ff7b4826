//! # Domain Errors
//!
//! Error types for channel discovery and commit-event subscriptions.

use cg_01_node_registry::RegistryError;
use cg_02_identity_context::IdentityError;
use shared_types::{TransactionId, TransportError};
use thiserror::Error;

/// Channel topology errors.
#[derive(Debug, Clone, Error)]
pub enum TopologyError {
    /// A node is not registered or has the wrong type.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The identity for a peer could not be bound.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A peer's channel query failed with something other than access denied.
    #[error("channel query on peer '{peer}' failed: {source}")]
    Peer {
        /// Peer queried.
        peer: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// Channels were discovered but no orderer is registered.
    #[error("no orderer registered to bind channel '{channel}' to")]
    NoOrderer {
        /// First channel that needed an orderer.
        channel: String,
    },

    /// The channel is not part of the topology.
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),
}

impl TopologyError {
    /// Whether the failure means an unknown node or channel.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Registry(inner) => inner.is_not_found(),
            Self::Identity(inner) => inner.is_not_found(),
            Self::ChannelNotFound(_) => true,
            _ => false,
        }
    }
}

/// Commit-event subscription errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The commit event carried a validation code other than `VALID`.
    #[error("transaction {tx_id} was invalidated with code {validation_code} (block {block_number})")]
    Invalid {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Code reported by the committing peer.
        validation_code: String,
        /// Block the transaction landed in.
        block_number: u64,
    },

    /// The event feed itself failed.
    #[error("commit event feed from peer '{peer}' on channel '{channel}' failed: {source}")]
    Transport {
        /// Peer serving the feed.
        peer: String,
        /// Channel of the feed.
        channel: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// The wait was cancelled by unregister, disconnect or teardown.
    #[error("commit wait for transaction {tx_id} cancelled")]
    Cancelled {
        /// Transaction ID.
        tx_id: TransactionId,
    },

    /// The subscription was disconnected and accepts no new listeners.
    #[error("event subscription for peer '{peer}' on channel '{channel}' is disconnected")]
    Disconnected {
        /// Peer of the subscription.
        peer: String,
        /// Channel of the subscription.
        channel: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_surfaces_code() {
        let err = EventError::Invalid {
            tx_id: TransactionId::from_string("abc"),
            validation_code: "MVCC_READ_CONFLICT".into(),
            block_number: 7,
        };
        assert_eq!(
            err.to_string(),
            "transaction abc was invalidated with code MVCC_READ_CONFLICT (block 7)"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(TopologyError::ChannelNotFound("c".into()).is_not_found());
        assert!(TopologyError::Registry(RegistryError::NodeNotFound("p".into())).is_not_found());
        assert!(!TopologyError::NoOrderer { channel: "c".into() }.is_not_found());
    }
}
