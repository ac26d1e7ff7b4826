//! # Domain Errors
//!
//! Error types for identity resolution.

use cg_01_node_registry::RegistryError;
use shared_types::WalletError;
use thiserror::Error;

/// Identity context errors.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The node is not registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The node references a wallet nobody provided.
    #[error("wallet '{wallet}' referenced by node '{node}' not found")]
    WalletNotFound {
        /// Node whose descriptor names the wallet.
        node: String,
        /// Missing wallet.
        wallet: String,
    },

    /// The wallet exists but holds no identity with the configured label.
    #[error("identity '{identity}' for node '{node}' not found in wallet '{wallet}'")]
    IdentityNotFound {
        /// Node whose descriptor names the identity.
        node: String,
        /// Wallet searched.
        wallet: String,
        /// Missing identity label.
        identity: String,
    },

    /// The wallet backend failed.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl IdentityError {
    /// Whether the failure means "unknown node".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Registry(inner) if inner.is_not_found())
    }
}
