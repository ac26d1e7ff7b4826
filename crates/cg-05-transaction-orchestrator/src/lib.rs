//! # CG-05: Transaction Orchestrator Subsystem
//!
//! The endorse, order, commit state machine behind chaincode install,
//! instantiate, upgrade and invocation.
//!
//! ## Architecture
//!
//! - **Domain**: `TransactionContext`, endorsement validation, requests and
//!   outputs, errors
//! - **Ports**: Inbound (`TransactionOrchestratorApi`)
//! - **Service**: `TransactionOrchestrator`
//!
//! ## Sequence
//!
//! ```text
//! scope(peer) -> proposal -> validate      BUILDING -> ENDORSING -> ENDORSED
//! scope(peer) -> register commit listener  ORDERING
//! scope(peer) -> broadcast to orderer      (rejected: unregister, FAILED)
//! wait for commit event                    AWAITING_COMMIT -> COMMITTED
//! ```
//!
//! Instantiate and upgrade check the channel's instantiated chaincode
//! before any proposal is sent.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::OrchestratorConfig;
pub use domain::{
    ChaincodeDeployment, ChaincodePackage, EndorsementResult, EndorsementSet, InvokeMode,
    InvokeRequest, OrchestratorError, TransactionContext, TransactionOutput,
};
pub use ports::TransactionOrchestratorApi;
pub use service::{TransactionOrchestrator, METADATA_FUNCTION};
