//! Configuration for the Transaction Orchestrator

use serde::{Deserialize, Serialize};
use shared_types::{BROADCAST_SUCCESS, PROPOSAL_SUCCESS_STATUS};
use std::time::Duration;

/// Default bound on the commit-event wait, in seconds.
pub const DEFAULT_COMMIT_TIMEOUT_SECS: u64 = 300;

/// Orchestrator configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Proposal response status that counts as an endorsement
    pub proposal_success_status: u32,
    /// Broadcast acknowledgement status that counts as accepted
    pub broadcast_success_status: String,
    /// Bound on the commit-event wait (`None` waits forever)
    pub commit_timeout_secs: Option<u64>,
}

impl OrchestratorConfig {
    /// Commit-event wait bound.
    pub fn commit_timeout(&self) -> Option<Duration> {
        self.commit_timeout_secs.map(Duration::from_secs)
    }

    /// Builder: set the commit-event wait bound.
    #[must_use]
    pub fn with_commit_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.commit_timeout_secs = timeout.map(|t| t.as_secs().max(1));
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            proposal_success_status: PROPOSAL_SUCCESS_STATUS,
            broadcast_success_status: BROADCAST_SUCCESS.to_string(),
            commit_timeout_secs: Some(DEFAULT_COMMIT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.proposal_success_status, 200);
        assert_eq!(config.broadcast_success_status, "SUCCESS");
        assert_eq!(config.commit_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_unbounded_commit_wait() {
        let config = OrchestratorConfig::default().with_commit_timeout(None);
        assert_eq!(config.commit_timeout(), None);
    }
}
