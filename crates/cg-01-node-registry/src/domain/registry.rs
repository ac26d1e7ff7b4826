//! # Registry State
//!
//! Immutable snapshot of the loaded nodes and their client handles.
//! A new snapshot is built in full before it replaces the old one, so a
//! failed load never leaves a half-populated registry behind.

use super::errors::RegistryError;
use shared_types::{Node, NodeClient, NodeClientFactory, NodeType};
use std::collections::HashMap;

/// A node together with its eagerly constructed client handle.
#[derive(Debug, Clone)]
pub struct RegisteredNode {
    /// The node descriptor.
    pub node: Node,
    /// Client handle, built once at load time.
    pub client: NodeClient,
}

/// Loaded registry contents.
#[derive(Debug, Default)]
pub struct RegistryState {
    /// Nodes in load order.
    nodes: Vec<RegisteredNode>,
    /// Name -> position in `nodes`.
    index: HashMap<String, usize>,
}

impl RegistryState {
    /// Validate `nodes` and construct one client per node.
    pub fn build(nodes: Vec<Node>, factory: &dyn NodeClientFactory) -> Result<Self, RegistryError> {
        let mut state = Self {
            nodes: Vec::with_capacity(nodes.len()),
            index: HashMap::with_capacity(nodes.len()),
        };

        for node in nodes {
            node.validate()?;
            if state.index.contains_key(&node.name) {
                return Err(RegistryError::DuplicateNode(node.name));
            }

            let client = factory
                .connect(&node)
                .map_err(|source| RegistryError::ClientConstruction {
                    name: node.name.clone(),
                    source,
                })?;

            if client.node_type() != node.node_type {
                return Err(RegistryError::WrongNodeType {
                    name: node.name,
                    expected: node.node_type,
                    actual: client.node_type(),
                });
            }

            state.index.insert(node.name.clone(), state.nodes.len());
            state.nodes.push(RegisteredNode { node, client });
        }

        Ok(state)
    }

    /// Look up a registered node.
    pub fn get(&self, name: &str) -> Option<&RegisteredNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Names of nodes of `node_type`, in load order.
    pub fn names(&self, node_type: NodeType) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|entry| entry.node.node_type == node_type)
            .map(|entry| entry.node.name.clone())
            .collect()
    }

    /// All nodes in load order.
    pub fn nodes(&self) -> impl Iterator<Item = &RegisteredNode> {
        self.nodes.iter()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
