//! # Domain Errors

use cg_01_node_registry::RegistryError;
use cg_02_identity_context::IdentityError;
use cg_03_channel_topology::TopologyError;
use shared_types::TransportError;
use thiserror::Error;

/// Query errors.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Unknown or mistyped node.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Identity binding failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Unknown channel or failed discovery.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The peer refused the query for lack of privilege.
    #[error("access denied by peer '{peer}': {message}")]
    AccessDenied {
        /// Peer queried.
        peer: String,
        /// Peer-supplied message.
        message: String,
    },

    /// Any other query failure.
    #[error("query on peer '{peer}' failed: {source}")]
    Peer {
        /// Peer queried.
        peer: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

impl QueryError {
    /// Classify a transport failure from `peer`.
    pub fn from_transport(peer: impl Into<String>, source: TransportError) -> Self {
        if source.is_access_denied() {
            Self::AccessDenied {
                peer: peer.into(),
                message: source.message().to_string(),
            }
        } else {
            Self::Peer {
                peer: peer.into(),
                source,
            }
        }
    }

    /// Whether the failure means an unknown node or channel.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Registry(inner) => inner.is_not_found(),
            Self::Identity(inner) => inner.is_not_found(),
            Self::Topology(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}
