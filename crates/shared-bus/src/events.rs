//! # Gateway Events
//!
//! Defines all event types that flow through the shared bus.
//! Subsystems publish state changes here instead of relying on listener
//! registration order; consumers subscribe with an `EventFilter`.

use serde::{Deserialize, Serialize};
use shared_types::entities::{TransactionId, TransactionState};

/// Certificate authority operations reported on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaOperation {
    /// Enrollment of an existing ID.
    Enroll,
    /// Registration of a new ID.
    Register,
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GatewayEvent {
    // =========================================================================
    // RUNTIME
    // =========================================================================
    /// The gateway started or finished a long-running operation.
    GatewayBusy {
        /// Whether the gateway is busy.
        busy: bool,
        /// What it is busy with.
        reason: String,
    },

    /// The gateway tore down its connection.
    Disconnected,

    // =========================================================================
    // SUBSYSTEM 1: NODE REGISTRY
    // =========================================================================
    /// The registry was (re)loaded.
    RegistryLoaded {
        /// Number of nodes now registered.
        nodes: usize,
    },

    // =========================================================================
    // SUBSYSTEM 2: IDENTITY CONTEXT
    // =========================================================================
    /// A signing identity was bound to a node's context.
    IdentityBound {
        /// Node the identity is bound for.
        node: String,
        /// Identity label.
        identity: String,
        /// MSP of the identity.
        msp_id: String,
    },

    // =========================================================================
    // SUBSYSTEM 3: CHANNEL TOPOLOGY
    // =========================================================================
    /// A discovery pass produced a new topology snapshot.
    TopologyDiscovered {
        /// Snapshot version.
        version: u64,
        /// Channel names in the snapshot.
        channels: Vec<String>,
        /// Peers that denied access and contributed no channels.
        peers_denied: Vec<String>,
    },

    // =========================================================================
    // SUBSYSTEM 4: CERTIFICATE AUTHORITY
    // =========================================================================
    /// An enroll or register call finished.
    CertificateAuthorityOperation {
        /// CA node name.
        ca: String,
        /// Operation performed.
        operation: CaOperation,
        /// Enrollment ID the operation concerned.
        enrollment_id: String,
        /// Whether the CA accepted it.
        success: bool,
    },

    // =========================================================================
    // SUBSYSTEM 5: TRANSACTION ORCHESTRATOR
    // =========================================================================
    /// A transaction moved between lifecycle states.
    TransactionStateChanged {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Chaincode the transaction targets.
        chaincode: String,
        /// Previous state.
        from: TransactionState,
        /// New state.
        to: TransactionState,
    },

    /// A transaction reached a terminal state.
    TransactionCompleted {
        /// Transaction ID.
        tx_id: TransactionId,
        /// Chaincode the transaction targets.
        chaincode: String,
        /// Final state (`Committed` or `Failed`).
        state: TransactionState,
        /// Failure message when `state` is `Failed`.
        error: Option<String>,
    },
}

impl GatewayEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::GatewayBusy { .. } | Self::Disconnected => EventTopic::Runtime,
            Self::RegistryLoaded { .. } => EventTopic::Registry,
            Self::IdentityBound { .. } => EventTopic::Identity,
            Self::TopologyDiscovered { .. } => EventTopic::Topology,
            Self::CertificateAuthorityOperation { .. } => EventTopic::CertificateAuthority,
            Self::TransactionStateChanged { .. } | Self::TransactionCompleted { .. } => {
                EventTopic::Transaction
            }
        }
    }

    /// Get the originating subsystem ID (0 = runtime).
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::GatewayBusy { .. } | Self::Disconnected => 0,
            Self::RegistryLoaded { .. } => 1,
            Self::IdentityBound { .. } => 2,
            Self::TopologyDiscovered { .. } => 3,
            Self::CertificateAuthorityOperation { .. } => 4,
            Self::TransactionStateChanged { .. } | Self::TransactionCompleted { .. } => 5,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Runtime lifecycle events.
    Runtime,
    /// Subsystem 1 events.
    Registry,
    /// Subsystem 2 events.
    Identity,
    /// Subsystem 3 events.
    Topology,
    /// Subsystem 4 events.
    CertificateAuthority,
    /// Subsystem 5 events.
    Transaction,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &GatewayEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
