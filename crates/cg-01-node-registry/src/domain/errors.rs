//! # Domain Errors
//!
//! Error types for the Node Registry.

use shared_types::{NodeType, NodeValidationError, TransportError};
use thiserror::Error;

/// Node registry errors.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// No node with this name was loaded.
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    /// Two descriptors share a name.
    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),

    /// A descriptor failed validation.
    #[error(transparent)]
    InvalidNode(#[from] NodeValidationError),

    /// The node exists but has another role.
    #[error("node '{name}' is a {actual}, expected a {expected}")]
    WrongNodeType {
        /// Node name.
        name: String,
        /// Role the caller needed.
        expected: NodeType,
        /// Role the node has.
        actual: NodeType,
    },

    /// The client handle for a node could not be built.
    #[error("failed to construct client for node '{name}': {source}")]
    ClientConstruction {
        /// Node name.
        name: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

impl RegistryError {
    /// Whether this is the "unknown node" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RegistryError::NodeNotFound("peer9".into());
        assert_eq!(err.to_string(), "node 'peer9' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_wrong_type_display() {
        let err = RegistryError::WrongNodeType {
            name: "orderer0".into(),
            expected: NodeType::Peer,
            actual: NodeType::Orderer,
        };
        assert_eq!(err.to_string(), "node 'orderer0' is a orderer, expected a peer");
    }
}
