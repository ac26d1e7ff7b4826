//! Configuration for the Channel Topology Subsystem

use crate::domain::OrdererSelection;
use serde::{Deserialize, Serialize};

/// Topology configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// How the orderer of each channel is chosen
    pub orderer_selection: OrdererSelection,
    /// Run a discovery pass when an unknown channel is requested
    pub discover_on_demand: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            orderer_selection: OrdererSelection::FirstRegistered,
            discover_on_demand: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TopologyConfig::default();
        assert_eq!(config.orderer_selection, OrdererSelection::FirstRegistered);
        assert!(config.discover_on_demand);
    }
}
