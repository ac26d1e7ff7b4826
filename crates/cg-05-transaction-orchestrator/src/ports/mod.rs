//! Ports module for transaction orchestration

pub mod inbound;

pub use inbound::TransactionOrchestratorApi;
