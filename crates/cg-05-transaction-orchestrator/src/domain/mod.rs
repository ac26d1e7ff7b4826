//! Domain layer for the Transaction Orchestrator

pub mod context;
pub mod endorsement;
pub mod errors;
pub mod request;

pub use context::TransactionContext;
pub use endorsement::{validate_endorsements, EndorsementResult, EndorsementSet};
pub use errors::OrchestratorError;
pub use request::{ChaincodeDeployment, ChaincodePackage, InvokeMode, InvokeRequest, TransactionOutput};
