//! # Domain Errors
//!
//! Every failure carries the peer or orderer involved, the transaction ID
//! where one exists, and the message the network reported.

use cg_01_node_registry::RegistryError;
use cg_02_identity_context::IdentityError;
use cg_03_channel_topology::{EventError, TopologyError};
use shared_types::{TransactionId, TransactionState, TransportError};
use std::time::Duration;
use thiserror::Error;

/// Transaction orchestrator errors.
#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    /// Unknown or mistyped node.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Identity binding failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Channel lookup or discovery failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The install proposal was not endorsed.
    #[error("install on peer '{peer}' failed: {message}")]
    Install {
        /// Target peer.
        peer: String,
        /// Peer-supplied message.
        message: String,
    },

    /// Instantiate found the chaincode already on the channel.
    #[error("chaincode '{chaincode}' is already instantiated on channel '{channel}'")]
    AlreadyInstantiated {
        /// Chaincode name.
        chaincode: String,
        /// Channel checked.
        channel: String,
    },

    /// Upgrade found no such chaincode on the channel.
    #[error("chaincode '{chaincode}' is not instantiated on channel '{channel}'")]
    NotInstantiated {
        /// Chaincode name.
        chaincode: String,
        /// Channel checked.
        channel: String,
    },

    /// A read-only query needed by the operation failed.
    #[error("query on peer '{peer}' failed: {source}")]
    PeerQuery {
        /// Peer queried.
        peer: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// An endorser returned an error or a non-success status.
    #[error("endorsement of transaction {tx_id} by peer '{peer}' failed: {message}")]
    Endorsement {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Endorsing peer.
        peer: String,
        /// Peer-supplied message.
        message: String,
    },

    /// The orderer did not accept the transaction.
    #[error("orderer '{orderer}' rejected transaction {tx_id} with status {status}: {info}")]
    Ordering {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Orderer name.
        orderer: String,
        /// Acknowledgement status (`SERVICE_UNAVAILABLE` when unreachable).
        status: String,
        /// Additional orderer information.
        info: String,
    },

    /// The commit event reported the transaction invalid.
    #[error("transaction {tx_id} failed validation on peer '{peer}' with code {validation_code}")]
    CommitValidation {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Peer that reported the commit.
        peer: String,
        /// Reported validation code.
        validation_code: String,
    },

    /// No commit event arrived within the configured bound.
    #[error("no commit event for transaction {tx_id} from peer '{peer}' within {timeout:?}")]
    CommitTimeout {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Peer waited on.
        peer: String,
        /// Bound that expired.
        timeout: Duration,
    },

    /// The commit-event subscription failed or was cancelled.
    #[error("commit wait for transaction {tx_id} on peer '{peer}' failed: {source}")]
    EventSubscription {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Peer of the subscription.
        peer: String,
        /// Subscription failure.
        #[source]
        source: EventError,
    },

    /// A read-only evaluation was not endorsed.
    #[error("evaluation on peer '{peer}' failed: {message}")]
    Evaluation {
        /// Evaluating peer.
        peer: String,
        /// Peer-supplied message.
        message: String,
    },

    /// Chaincode metadata could not be decoded.
    #[error("metadata of chaincode '{chaincode}' is unreadable: {message}")]
    Metadata {
        /// Chaincode name.
        chaincode: String,
        /// Decoder message.
        message: String,
    },

    /// The state machine refused a transition.
    #[error("transaction {tx_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Current state.
        from: TransactionState,
        /// Requested state.
        to: TransactionState,
    },
}

impl OrchestratorError {
    /// Whether the failure means an unknown node or channel.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Registry(inner) => inner.is_not_found(),
            Self::Identity(inner) => inner.is_not_found(),
            Self::Topology(inner) => inner.is_not_found(),
            _ => false,
        }
    }

    /// Whether the failure happened after the orderer accepted the
    /// transaction, so the ledger may still commit it.
    pub fn is_commit_outcome_unknown(&self) -> bool {
        matches!(self, Self::CommitTimeout { .. } | Self::EventSubscription { .. })
    }
}
