//! # Endorsement Validation

use crate::domain::errors::OrchestratorError;
use shared_types::{EndorsementResponse, ProposalResponse, TransactionId};

/// One endorser's answer, produced by the endorsement phase.
#[derive(Debug, Clone)]
pub struct EndorsementResult {
    /// Peer the proposal was sent to.
    pub peer: String,
    /// The response, or the error the peer returned.
    pub response: EndorsementResponse,
}

impl EndorsementResult {
    /// Pair a response with its peer.
    pub fn new(peer: impl Into<String>, response: EndorsementResponse) -> Self {
        Self {
            peer: peer.into(),
            response,
        }
    }
}

/// Endorsements that passed validation, ready for ordering.
#[derive(Debug, Clone)]
pub struct EndorsementSet {
    responses: Vec<ProposalResponse>,
}

impl EndorsementSet {
    /// The validated responses.
    pub fn responses(&self) -> &[ProposalResponse] {
        &self.responses
    }

    /// Consume into the responses.
    pub fn into_responses(self) -> Vec<ProposalResponse> {
        self.responses
    }

    /// Chaincode payload of the first endorsement.
    pub fn payload(&self) -> &[u8] {
        self.responses
            .first()
            .map(|response| response.payload.as_slice())
            .unwrap_or_default()
    }
}

/// Validate every endorsement.
///
/// An error response fails immediately. A response whose status is not
/// `success_status` fails with the peer's message. An empty result set is
/// treated as a failure.
pub fn validate_endorsements(
    tx_id: &TransactionId,
    results: Vec<EndorsementResult>,
    success_status: u32,
) -> Result<EndorsementSet, OrchestratorError> {
    if results.is_empty() {
        return Err(OrchestratorError::Endorsement {
            tx_id: tx_id.clone(),
            peer: String::new(),
            message: "no endorsement responses received".to_string(),
        });
    }

    let mut responses = Vec::with_capacity(results.len());
    for result in results {
        match result.response {
            Err(source) => {
                return Err(OrchestratorError::Endorsement {
                    tx_id: tx_id.clone(),
                    peer: result.peer,
                    message: source.to_string(),
                });
            }
            Ok(response) if response.status != success_status => {
                return Err(OrchestratorError::Endorsement {
                    tx_id: tx_id.clone(),
                    peer: result.peer,
                    message: format!("status {}: {}", response.status, response.message),
                });
            }
            Ok(response) => responses.push(response),
        }
    }
    Ok(EndorsementSet { responses })
}
