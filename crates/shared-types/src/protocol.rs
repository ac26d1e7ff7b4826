//! # Protocol Surface
//!
//! Request/response and publish/subscribe primitives toward peers, orderers
//! and certificate authorities. Transports implement the client traits; the
//! subsystems only ever see these types.
//!
//! ## Calls
//!
//! | Call | Target | Primitive |
//! |------|--------|-----------|
//! | proposal send | peer | request/response (`PeerClient::send_proposal`) |
//! | broadcast send | orderer | request/response (`OrdererClient::broadcast`) |
//! | commit events | peer | subscription (`PeerClient::open_commit_feed`) |
//! | enroll/register | CA | request/response (`CertificateAuthorityTransport`) |

use crate::entities::{ChaincodeInfo, Node, NodeType, TransactionId};
use crate::errors::TransportError;
use crate::identity::{PrivateKey, SigningIdentity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Proposal response status meaning "endorsed".
pub const PROPOSAL_SUCCESS_STATUS: u32 = 200;

/// Broadcast acknowledgement status meaning "accepted for ordering".
pub const BROADCAST_SUCCESS: &str = "SUCCESS";

/// Commit validation code meaning "transaction is valid".
pub const VALIDATION_CODE_VALID: &str = "VALID";

// =============================================================================
// PROPOSALS
// =============================================================================

/// What a proposal asks the peer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    /// Install a chaincode package on the peer.
    Install,
    /// Instantiate a chaincode on a channel.
    Instantiate,
    /// Upgrade an instantiated chaincode.
    Upgrade,
    /// Invoke a chaincode function (ledger-mutating).
    Invoke,
    /// Evaluate a chaincode function (read-only).
    Query,
}

/// A transaction proposal sent to endorsing peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Fresh transaction ID.
    pub tx_id: TransactionId,
    /// Requested action.
    pub kind: ProposalKind,
    /// Target channel (absent for install).
    pub channel: Option<String>,
    /// Chaincode name.
    pub chaincode_name: String,
    /// Chaincode version (empty for invoke/query).
    pub chaincode_version: String,
    /// Function to call.
    pub function: String,
    /// Function arguments.
    pub args: Vec<String>,
    /// Private inputs that must not be written to the ledger.
    #[serde(default)]
    pub transient: BTreeMap<String, Vec<u8>>,
    /// Chaincode package bytes (install only).
    #[serde(default)]
    pub package: Option<Vec<u8>>,
    /// Endorsement policy expression (instantiate/upgrade only).
    #[serde(default)]
    pub endorsement_policy: Option<String>,
    /// Private data collection configuration (instantiate/upgrade only).
    #[serde(default)]
    pub collections_config: Option<String>,
}

impl Proposal {
    /// Create a proposal with no arguments.
    pub fn new(tx_id: TransactionId, kind: ProposalKind, chaincode_name: impl Into<String>) -> Self {
        Self {
            tx_id,
            kind,
            channel: None,
            chaincode_name: chaincode_name.into(),
            chaincode_version: String::new(),
            function: String::new(),
            args: Vec::new(),
            transient: BTreeMap::new(),
            package: None,
            endorsement_policy: None,
            collections_config: None,
        }
    }

    /// Set the target channel.
    #[must_use]
    pub fn on_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Set the chaincode version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.chaincode_version = version.into();
        self
    }

    /// Set function and arguments.
    #[must_use]
    pub fn with_call(mut self, function: impl Into<String>, args: Vec<String>) -> Self {
        self.function = function.into();
        self.args = args;
        self
    }

    /// Set transient data.
    #[must_use]
    pub fn with_transient(mut self, transient: BTreeMap<String, Vec<u8>>) -> Self {
        self.transient = transient;
        self
    }

    /// Attach a chaincode package.
    #[must_use]
    pub fn with_package(mut self, package: Vec<u8>) -> Self {
        self.package = Some(package);
        self
    }

    /// Attach deployment options.
    #[must_use]
    pub fn with_deployment_options(
        mut self,
        endorsement_policy: Option<String>,
        collections_config: Option<String>,
    ) -> Self {
        self.endorsement_policy = endorsement_policy;
        self.collections_config = collections_config;
        self
    }
}

/// A peer's answer to a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalResponse {
    /// Name of the responding peer.
    pub peer_name: String,
    /// Status code (200 means endorsed).
    pub status: u32,
    /// Peer-supplied message.
    pub message: String,
    /// Response payload returned by the chaincode.
    pub payload: Vec<u8>,
}

impl ProposalResponse {
    /// A successful response carrying `payload`.
    pub fn success(peer_name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            peer_name: peer_name.into(),
            status: PROPOSAL_SUCCESS_STATUS,
            message: "OK".to_string(),
            payload,
        }
    }

    /// A response with a non-success status.
    pub fn failure(peer_name: impl Into<String>, status: u32, message: impl Into<String>) -> Self {
        Self {
            peer_name: peer_name.into(),
            status,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    /// Whether the peer endorsed the proposal.
    pub fn is_success(&self) -> bool {
        self.status == PROPOSAL_SUCCESS_STATUS
    }
}

/// One endorsement slot: either a response or the error the peer returned.
pub type EndorsementResponse = Result<ProposalResponse, TransportError>;

// =============================================================================
// ORDERING
// =============================================================================

/// An endorsed transaction submitted to the orderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    /// Transaction ID of the proposal.
    pub tx_id: TransactionId,
    /// Channel the transaction is ordered on.
    pub channel: String,
    /// The original proposal.
    pub proposal: Proposal,
    /// Endorsements collected for the proposal.
    pub endorsements: Vec<ProposalResponse>,
}

/// The orderer's acknowledgement of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Status sentinel (`SUCCESS` on acceptance).
    pub status: String,
    /// Additional information from the orderer.
    pub info: String,
}

impl BroadcastResponse {
    /// An accepted broadcast.
    pub fn success() -> Self {
        Self {
            status: BROADCAST_SUCCESS.to_string(),
            info: String::new(),
        }
    }

    /// Whether the orderer accepted the transaction.
    pub fn is_success(&self) -> bool {
        self.status == BROADCAST_SUCCESS
    }
}

// =============================================================================
// COMMIT EVENTS
// =============================================================================

/// Notification that a transaction's block was validated by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEvent {
    /// The committed transaction.
    pub tx_id: TransactionId,
    /// Channel of the block.
    pub channel: String,
    /// Validation code assigned by the committing peer.
    pub validation_code: String,
    /// Block the transaction landed in.
    pub block_number: u64,
}

impl CommitEvent {
    /// Whether the peer marked the transaction valid.
    pub fn is_valid(&self) -> bool {
        self.validation_code == VALIDATION_CODE_VALID
    }
}

/// A stream of commit events (or the feed's transport failure).
pub type CommitEventFeed = mpsc::Receiver<Result<CommitEvent, TransportError>>;

// =============================================================================
// CERTIFICATE AUTHORITY
// =============================================================================

/// Material returned by a successful enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// PEM-encoded certificate.
    pub certificate: String,
    /// PEM-encoded private key.
    pub private_key: PrivateKey,
}

/// An attribute embedded in issued certificates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: String,
    /// Whether the attribute is added to enrollment certificates by default.
    #[serde(default)]
    pub ecert: bool,
}

/// A request to register a new enrollment ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Enrollment ID to register.
    pub enrollment_id: String,
    /// Affiliation of the new identity.
    pub affiliation: String,
    /// Identity type (`client`, `peer`, ...).
    #[serde(default)]
    pub role: Option<String>,
    /// Certificate attributes.
    #[serde(default)]
    pub attributes: Vec<RegistrationAttribute>,
    /// Maximum number of enrollments (None = CA default).
    #[serde(default)]
    pub max_enrollments: Option<u32>,
}

impl RegistrationRequest {
    /// A plain registration request.
    pub fn new(enrollment_id: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            enrollment_id: enrollment_id.into(),
            affiliation: affiliation.into(),
            role: None,
            attributes: Vec::new(),
            max_enrollments: None,
        }
    }
}

// =============================================================================
// CLIENT PORTS
// =============================================================================

/// Transport to one peer.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Name of the peer this client talks to.
    fn node_name(&self) -> &str;

    /// Channels the peer has joined.
    async fn query_channels(&self, signer: &SigningIdentity) -> Result<Vec<String>, TransportError>;

    /// Chaincode packages installed on the peer (admin only).
    async fn query_installed_chaincodes(
        &self,
        signer: &SigningIdentity,
    ) -> Result<Vec<ChaincodeInfo>, TransportError>;

    /// Chaincode instantiated on `channel`.
    async fn query_instantiated_chaincodes(
        &self,
        signer: &SigningIdentity,
        channel: &str,
    ) -> Result<Vec<ChaincodeInfo>, TransportError>;

    /// MSP IDs of the organizations defined in the channel configuration.
    async fn query_channel_organizations(
        &self,
        signer: &SigningIdentity,
        channel: &str,
    ) -> Result<Vec<String>, TransportError>;

    /// Send a proposal for endorsement.
    async fn send_proposal(
        &self,
        signer: &SigningIdentity,
        proposal: &Proposal,
    ) -> EndorsementResponse;

    /// Open a commit-event feed for `channel`.
    async fn open_commit_feed(
        &self,
        signer: &SigningIdentity,
        channel: &str,
    ) -> Result<CommitEventFeed, TransportError>;
}

/// Transport to one orderer.
#[async_trait]
pub trait OrdererClient: Send + Sync {
    /// Name of the orderer this client talks to.
    fn node_name(&self) -> &str;

    /// Submit an endorsed transaction for ordering.
    async fn broadcast(
        &self,
        signer: &SigningIdentity,
        request: &BroadcastRequest,
    ) -> Result<BroadcastResponse, TransportError>;
}

/// Transport to one certificate authority.
#[async_trait]
pub trait CertificateAuthorityTransport: Send + Sync {
    /// Name of the CA this client talks to.
    fn node_name(&self) -> &str;

    /// Enroll `enrollment_id` with its secret.
    async fn enroll(&self, enrollment_id: &str, secret: &str)
        -> Result<Enrollment, TransportError>;

    /// Register a new identity; returns the enrollment secret.
    async fn register(
        &self,
        registrar: &SigningIdentity,
        request: &RegistrationRequest,
    ) -> Result<String, TransportError>;
}

/// A constructed per-node client handle.
#[derive(Clone)]
pub enum NodeClient {
    /// Peer stub.
    Peer(Arc<dyn PeerClient>),
    /// Orderer stub.
    Orderer(Arc<dyn OrdererClient>),
    /// Certificate authority stub.
    CertificateAuthority(Arc<dyn CertificateAuthorityTransport>),
}

impl NodeClient {
    /// The node type this handle serves.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Peer(_) => NodeType::Peer,
            Self::Orderer(_) => NodeType::Orderer,
            Self::CertificateAuthority(_) => NodeType::CertificateAuthority,
        }
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Peer(c) => write!(f, "NodeClient::Peer({})", c.node_name()),
            Self::Orderer(c) => write!(f, "NodeClient::Orderer({})", c.node_name()),
            Self::CertificateAuthority(c) => {
                write!(f, "NodeClient::CertificateAuthority({})", c.node_name())
            }
        }
    }
}

/// Builds the client handle for a node.
///
/// Called once per node when the registry loads; construction must not
/// block on the network.
pub trait NodeClientFactory: Send + Sync {
    /// Construct the handle for `node`.
    fn connect(&self, node: &Node) -> Result<NodeClient, TransportError>;
}
