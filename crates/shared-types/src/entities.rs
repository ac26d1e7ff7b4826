//! # Core Domain Entities
//!
//! Defines the network entities every subsystem shares.
//!
//! ## Clusters
//!
//! - **Topology**: `Node`, `NodeType`
//! - **Chaincode**: `ChaincodeInfo`
//! - **Transactions**: `TransactionId`, `TransactionState`

use crate::errors::NodeValidationError;
use crate::identity::Identity;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// =============================================================================
// CLUSTER A: TOPOLOGY
// =============================================================================

/// The role a node plays in the network.
///
/// The type of a node is fixed when its descriptor is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    /// Executes chaincode and endorses proposals.
    #[serde(rename = "peer")]
    Peer,
    /// Sequences endorsed transactions into blocks.
    #[serde(rename = "orderer")]
    Orderer,
    /// Issues and enrolls identities.
    #[serde(rename = "ca")]
    CertificateAuthority,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peer => write!(f, "peer"),
            Self::Orderer => write!(f, "orderer"),
            Self::CertificateAuthority => write!(f, "ca"),
        }
    }
}

/// A configured network node.
///
/// Mirrors the external node descriptor record:
/// `{short_name, name, url, type, wallet, identity}`. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Short display name (defaults to `name`).
    #[serde(default)]
    pub short_name: String,
    /// Unique node name; the registry key.
    pub name: String,
    /// Endpoint URL.
    pub url: String,
    /// Node role.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Name of the wallet holding the node's identity.
    pub wallet: String,
    /// Name of the identity inside `wallet` used to talk to this node.
    pub identity: String,
    /// Membership service provider the node belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msp_id: Option<String>,
}

impl Node {
    /// Create a node descriptor.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        node_type: NodeType,
        wallet: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            short_name: name.clone(),
            name,
            url: url.into(),
            node_type,
            wallet: wallet.into(),
            identity: identity.into(),
            msp_id: None,
        }
    }

    /// Convenience constructor for a peer.
    pub fn peer(
        name: impl Into<String>,
        url: impl Into<String>,
        wallet: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self::new(name, url, NodeType::Peer, wallet, identity)
    }

    /// Convenience constructor for an orderer.
    pub fn orderer(
        name: impl Into<String>,
        url: impl Into<String>,
        wallet: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self::new(name, url, NodeType::Orderer, wallet, identity)
    }

    /// Convenience constructor for a certificate authority.
    pub fn certificate_authority(
        name: impl Into<String>,
        url: impl Into<String>,
        wallet: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self::new(name, url, NodeType::CertificateAuthority, wallet, identity)
    }

    /// Attach the membership service provider ID.
    #[must_use]
    pub fn with_msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = Some(msp_id.into());
        self
    }

    /// Display name: `short_name` when set, otherwise `name`.
    pub fn display_name(&self) -> &str {
        if self.short_name.is_empty() {
            &self.name
        } else {
            &self.short_name
        }
    }

    /// Check that the descriptor carries every mandatory field.
    pub fn validate(&self) -> Result<(), NodeValidationError> {
        if self.name.trim().is_empty() {
            return Err(NodeValidationError::MissingField {
                node: self.name.clone(),
                field: "name",
            });
        }
        if self.url.trim().is_empty() {
            return Err(NodeValidationError::MissingField {
                node: self.name.clone(),
                field: "url",
            });
        }
        if self.wallet.trim().is_empty() {
            return Err(NodeValidationError::MissingField {
                node: self.name.clone(),
                field: "wallet",
            });
        }
        if self.identity.trim().is_empty() {
            return Err(NodeValidationError::MissingField {
                node: self.name.clone(),
                field: "identity",
            });
        }
        Ok(())
    }
}

// =============================================================================
// CLUSTER B: CHAINCODE
// =============================================================================

/// A chaincode name/version pair as reported by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChaincodeInfo {
    /// Chaincode name.
    pub name: String,
    /// Chaincode version.
    pub version: String,
}

impl ChaincodeInfo {
    /// Create a chaincode descriptor.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// Length of the random nonce mixed into a transaction ID.
pub const TX_NONCE_LEN: usize = 24;

/// A transaction identifier.
///
/// Derived as `hex(SHA-256(nonce || creator certificate))`, so the ID binds
/// the submitting identity and is unique per proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh transaction ID for `creator`.
    pub fn generate(creator: &Identity) -> Self {
        let mut nonce = [0u8; TX_NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self::derive(&nonce, creator.certificate.as_bytes())
    }

    /// Deterministic derivation from a nonce and creator bytes.
    pub fn derive(nonce: &[u8], creator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of one submitted transaction.
///
/// ```text
/// Building -> Endorsing -> Endorsed -> Ordering -> AwaitingCommit -> Committed
///     \___________\___________\___________\_____________\______> Failed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Proposal under construction.
    #[default]
    Building,
    /// Proposal sent, waiting for endorsements.
    Endorsing,
    /// Every endorsement validated.
    Endorsed,
    /// Endorsed transaction being broadcast to the orderer.
    Ordering,
    /// Orderer accepted; waiting for the commit event.
    AwaitingCommit,
    /// Commit event reported the transaction valid.
    Committed,
    /// Aborted at some stage.
    Failed,
}

impl TransactionState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: TransactionState) -> bool {
        match (self, next) {
            (Self::Building, Self::Endorsing) => true,
            (Self::Endorsing, Self::Endorsed) => true,
            (Self::Endorsed, Self::Ordering) => true,
            (Self::Ordering, Self::AwaitingCommit) => true,
            (Self::AwaitingCommit, Self::Committed) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Building => "BUILDING",
            Self::Endorsing => "ENDORSING",
            Self::Endorsed => "ENDORSED",
            Self::Ordering => "ORDERING",
            Self::AwaitingCommit => "AWAITING_COMMIT",
            Self::Committed => "COMMITTED",
            Self::Failed => "FAILED",
        };
        f.write_str(label)
    }
}
