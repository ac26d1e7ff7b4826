//! # Listing Results

use serde::{Deserialize, Serialize};
use shared_types::ChaincodeInfo;
use std::collections::BTreeMap;

/// Installed chaincode: name to installed versions (sorted).
pub type InstalledChaincode = BTreeMap<String, Vec<String>>;

/// Group chaincode descriptors by name, versions sorted and deduplicated.
pub fn group_by_name(chaincodes: Vec<ChaincodeInfo>) -> InstalledChaincode {
    let mut grouped = InstalledChaincode::new();
    for info in chaincodes {
        grouped.entry(info.name).or_default().push(info.version);
    }
    for versions in grouped.values_mut() {
        versions.sort();
        versions.dedup();
    }
    grouped
}

/// A channel member peer and the organization it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPeerInfo {
    /// Peer name.
    pub peer: String,
    /// MSP ID of the peer's organization.
    pub msp_id: String,
}
