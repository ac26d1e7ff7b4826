//! # Domain Errors

use cg_01_node_registry::RegistryError;
use cg_02_identity_context::IdentityError;
use shared_types::{TransportError, WalletError};
use thiserror::Error;

/// Certificate authority errors.
#[derive(Debug, Clone, Error)]
pub enum CertificateAuthorityError {
    /// The CA node is not registered or is not a CA.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The registrar identity could not be bound.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The CA rejected the call. Renders the CA's own message.
    #[error("{}", .source.message())]
    CertificateAuthority {
        /// CA node name.
        ca: String,
        /// Failure as reported by the CA.
        source: TransportError,
    },

    /// The target wallet for an enrolled identity does not exist.
    #[error("wallet '{0}' not found")]
    WalletNotFound(String),

    /// Importing the enrolled identity failed.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ca_message_passes_through() {
        let err = CertificateAuthorityError::CertificateAuthority {
            ca: "ca0".into(),
            source: TransportError::Rejected("Identity 'user1' is already registered".into()),
        };
        assert_eq!(err.to_string(), "Identity 'user1' is already registered");
    }
}
