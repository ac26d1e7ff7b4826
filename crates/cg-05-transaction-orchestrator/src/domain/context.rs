//! # Transaction Context
//!
//! Per-invocation record of one submitted transaction. Created when the
//! proposal is built, discarded after commit or failure, never shared.

use crate::domain::errors::OrchestratorError;
use shared_types::{TransactionId, TransactionState};

/// One transaction in flight.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    /// Transaction ID of the proposal.
    pub tx_id: TransactionId,
    /// Target chaincode.
    pub chaincode: String,
    /// Chaincode version (empty for plain invocations).
    pub version: String,
    /// Function called.
    pub function: String,
    /// Function arguments.
    pub args: Vec<String>,
    /// Channel the transaction is ordered on.
    pub channel: String,
    /// Representative peer (endorser and commit-event source).
    pub peer: String,
    /// Orderer the transaction is broadcast to.
    pub orderer: String,
    state: TransactionState,
    history: Vec<TransactionState>,
}

impl TransactionContext {
    /// New context in `Building`.
    pub fn new(
        tx_id: TransactionId,
        chaincode: impl Into<String>,
        channel: impl Into<String>,
        peer: impl Into<String>,
        orderer: impl Into<String>,
    ) -> Self {
        Self {
            tx_id,
            chaincode: chaincode.into(),
            version: String::new(),
            function: String::new(),
            args: Vec::new(),
            channel: channel.into(),
            peer: peer.into(),
            orderer: orderer.into(),
            state: TransactionState::Building,
            history: vec![TransactionState::Building],
        }
    }

    /// Builder: chaincode version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Builder: function and arguments.
    #[must_use]
    pub fn with_call(mut self, function: impl Into<String>, args: Vec<String>) -> Self {
        self.function = function.into();
        self.args = args;
        self
    }

    /// Current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Every state entered, starting with `Building`.
    pub fn history(&self) -> &[TransactionState] {
        &self.history
    }

    /// Move to `next`. Returns the state left.
    pub fn transition(&mut self, next: TransactionState) -> Result<TransactionState, OrchestratorError> {
        if !self.state.can_transition_to(next) {
            return Err(OrchestratorError::InvalidTransition {
                tx_id: self.tx_id.clone(),
                from: self.state,
                to: next,
            });
        }
        let previous = self.state;
        self.state = next;
        self.history.push(next);
        Ok(previous)
    }

    /// Move to `Failed` unless already terminal. Returns the state left.
    pub fn fail(&mut self) -> Option<TransactionState> {
        if self.state.is_terminal() {
            return None;
        }
        self.transition(TransactionState::Failed).ok()
    }
}
