//! # Requests and Outputs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A chaincode package to install on a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodePackage {
    /// Chaincode name.
    pub name: String,
    /// Chaincode version.
    pub version: String,
    /// Package bytes, as produced by the packaging tool.
    pub bytes: Vec<u8>,
}

impl ChaincodePackage {
    /// Create a package.
    pub fn new(name: impl Into<String>, version: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            bytes,
        }
    }
}

/// Instantiate or upgrade request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeDeployment {
    /// Chaincode name.
    pub name: String,
    /// Version to instantiate or upgrade to.
    pub version: String,
    /// Target channel.
    pub channel: String,
    /// Init function (may be empty).
    pub function: String,
    /// Init arguments.
    pub args: Vec<String>,
    /// Endorsement policy expression.
    #[serde(default)]
    pub endorsement_policy: Option<String>,
    /// Private data collection configuration (JSON).
    #[serde(default)]
    pub collections_config: Option<String>,
}

impl ChaincodeDeployment {
    /// Deployment with an init call.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        channel: impl Into<String>,
        function: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            channel: channel.into(),
            function: function.into(),
            args,
            endorsement_policy: None,
            collections_config: None,
        }
    }

    /// Builder: endorsement policy.
    #[must_use]
    pub fn with_endorsement_policy(mut self, policy: impl Into<String>) -> Self {
        self.endorsement_policy = Some(policy.into());
        self
    }

    /// Builder: private data collections.
    #[must_use]
    pub fn with_collections_config(mut self, config: impl Into<String>) -> Self {
        self.collections_config = Some(config.into());
        self
    }
}

/// Whether an invocation reads or writes the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvokeMode {
    /// Read only: one endorsement, nothing ordered.
    Evaluate,
    /// Ledger-mutating: endorse, order, wait for commit.
    Submit,
}

/// A chaincode function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Channel the chaincode is instantiated on.
    pub channel: String,
    /// Chaincode name.
    pub chaincode: String,
    /// Function name.
    pub function: String,
    /// Function arguments.
    pub args: Vec<String>,
    /// Private inputs passed outside the ledger-visible arguments.
    #[serde(default)]
    pub transient: BTreeMap<String, Vec<u8>>,
}

impl InvokeRequest {
    /// Create a call.
    pub fn new(
        channel: impl Into<String>,
        chaincode: impl Into<String>,
        function: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            chaincode: chaincode.into(),
            function: function.into(),
            args,
            transient: BTreeMap::new(),
        }
    }

    /// Builder: add one transient entry.
    #[must_use]
    pub fn with_transient(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.transient.insert(key.into(), value);
        self
    }
}

/// What a successful transaction returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutput {
    /// The function's raw response payload.
    Payload(Vec<u8>),
    /// The function returned nothing.
    NoResult,
}

impl TransactionOutput {
    /// `Payload` for non-empty bytes, otherwise `NoResult`.
    pub fn from_payload(payload: Vec<u8>) -> Self {
        if payload.is_empty() {
            Self::NoResult
        } else {
            Self::Payload(payload)
        }
    }

    /// Payload bytes, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Payload(bytes) => Some(bytes),
            Self::NoResult => None,
        }
    }

    /// Whether the function returned nothing.
    pub fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult)
    }
}
