//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Failures reported by the transport toward a network node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The node refused the call for lack of privilege.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The node could not be reached.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// The node processed the call and rejected it.
    #[error("{0}")]
    Rejected(String),

    /// The stream or connection was closed by the remote side.
    #[error("connection closed: {0}")]
    Closed(String),
}

impl TransportError {
    /// Whether this failure means "insufficient privilege".
    ///
    /// Some transports only surface the condition as message text, so the
    /// message is matched as well as the variant.
    pub fn is_access_denied(&self) -> bool {
        match self {
            Self::AccessDenied(_) => true,
            Self::Unavailable(msg) | Self::Rejected(msg) | Self::Closed(msg) => {
                msg.to_ascii_lowercase().contains("access denied")
            }
        }
    }

    /// The human readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::AccessDenied(msg)
            | Self::Unavailable(msg)
            | Self::Rejected(msg)
            | Self::Closed(msg) => msg,
        }
    }
}

/// Errors raised by wallet implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No identity with this label exists in the wallet.
    #[error("identity '{name}' not found in wallet '{wallet}'")]
    IdentityNotFound { wallet: String, name: String },

    /// The identity label is already taken.
    #[error("identity '{name}' already exists in wallet '{wallet}'")]
    AlreadyExists { wallet: String, name: String },

    /// Backend failure (I/O, decoding, ...).
    #[error("wallet '{wallet}' failed: {message}")]
    Backend { wallet: String, message: String },
}

/// Node descriptor validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeValidationError {
    /// A mandatory descriptor field is empty.
    #[error("node '{node}' is missing required field '{field}'")]
    MissingField { node: String, field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_variant() {
        assert!(TransportError::AccessDenied("nope".into()).is_access_denied());
    }

    #[test]
    fn test_access_denied_message_match() {
        let err = TransportError::Rejected(
            "chaincode error (status: 500, message: access denied for [getinstalledchaincodes])"
                .into(),
        );
        assert!(err.is_access_denied());
        assert!(!TransportError::Unavailable("connect timeout".into()).is_access_denied());
    }

    #[test]
    fn test_rejected_display_is_raw_message() {
        let err = TransportError::Rejected("chaincode already exists".into());
        assert_eq!(err.to_string(), "chaincode already exists");
        assert_eq!(err.message(), "chaincode already exists");
    }

    #[test]
    fn test_wallet_error_display() {
        let err = WalletError::IdentityNotFound {
            wallet: "local".into(),
            name: "admin".into(),
        };
        assert_eq!(err.to_string(), "identity 'admin' not found in wallet 'local'");
    }
}
