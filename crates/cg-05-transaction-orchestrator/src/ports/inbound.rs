//! Inbound Ports (Driving Ports / API)

use crate::domain::{
    ChaincodeDeployment, ChaincodePackage, InvokeMode, InvokeRequest, OrchestratorError,
    TransactionOutput,
};
use async_trait::async_trait;

/// Chaincode lifecycle and invocation API.
///
/// Ledger-mutating calls run the full endorse, order, commit sequence and
/// only return once the commit event has been received.
#[async_trait]
pub trait TransactionOrchestratorApi: Send + Sync {
    /// Install `package` on a single peer.
    async fn install_chaincode(
        &self,
        package: ChaincodePackage,
        peer: &str,
    ) -> Result<(), OrchestratorError>;

    /// Instantiate a chaincode that is not yet instantiated on the channel.
    async fn instantiate_chaincode(
        &self,
        deployment: ChaincodeDeployment,
    ) -> Result<TransactionOutput, OrchestratorError>;

    /// Upgrade a chaincode that is already instantiated on the channel.
    async fn upgrade_chaincode(
        &self,
        deployment: ChaincodeDeployment,
    ) -> Result<TransactionOutput, OrchestratorError>;

    /// Endorse, order and commit one invocation.
    async fn submit_transaction(
        &self,
        request: InvokeRequest,
    ) -> Result<TransactionOutput, OrchestratorError>;

    /// Run a read-only invocation on one peer. Nothing is ordered.
    async fn evaluate_transaction(
        &self,
        request: InvokeRequest,
    ) -> Result<TransactionOutput, OrchestratorError>;

    /// Evaluate or submit, depending on `mode`.
    async fn invoke(
        &self,
        request: InvokeRequest,
        mode: InvokeMode,
    ) -> Result<TransactionOutput, OrchestratorError> {
        match mode {
            InvokeMode::Evaluate => self.evaluate_transaction(request).await,
            InvokeMode::Submit => self.submit_transaction(request).await,
        }
    }

    /// Contract metadata published by the chaincode, as JSON.
    async fn get_chaincode_metadata(
        &self,
        channel: &str,
        chaincode: &str,
    ) -> Result<serde_json::Value, OrchestratorError>;
}
