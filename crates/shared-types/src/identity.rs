//! # Signing Identities
//!
//! Certificate + private key pairs held by wallets and bound to node calls.
//!
//! ## Security
//!
//! Private keys are wrapped in `PrivateKey`, which zeroizes its buffer on
//! drop and never prints its contents.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PEM-encoded private key that zeroizes on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    inner: String,
}

impl PrivateKey {
    /// Wrap PEM key material.
    pub fn new(pem: impl Into<String>) -> Self {
        Self { inner: pem.into() }
    }

    /// Expose the PEM text (use immediately and let go).
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Whether the key material is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(***)")
    }
}

impl Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// An identity as stored in a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Label of the identity inside its wallet.
    pub name: String,
    /// PEM-encoded X.509 certificate.
    pub certificate: String,
    /// PEM-encoded private key.
    pub private_key: PrivateKey,
    /// Membership service provider the certificate belongs to.
    pub msp_id: String,
}

impl Identity {
    /// Create an identity.
    pub fn new(
        name: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
        msp_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            certificate: certificate.into(),
            private_key: PrivateKey::new(private_key),
            msp_id: msp_id.into(),
        }
    }

    /// SHA-256 fingerprint of the certificate, hex encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.certificate.as_bytes());
        hex::encode(digest)
    }
}

/// The signing context a network call runs under.
///
/// Cheap to clone; every clone refers to the same identity material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningIdentity {
    inner: Arc<Identity>,
}

impl SigningIdentity {
    /// Wrap an identity as a signing context.
    pub fn new(identity: Identity) -> Self {
        Self {
            inner: Arc::new(identity),
        }
    }

    /// The underlying identity.
    pub fn identity(&self) -> &Identity {
        &self.inner
    }

    /// Identity label.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Membership service provider ID.
    pub fn msp_id(&self) -> &str {
        &self.inner.msp_id
    }

    /// Short fingerprint (first 8 bytes) for log fields.
    pub fn short_fingerprint(&self) -> String {
        let mut fp = self.inner.fingerprint();
        fp.truncate(16);
        fp
    }
}

impl From<Identity> for SigningIdentity {
    fn from(identity: Identity) -> Self {
        Self::new(identity)
    }
}

impl fmt::Display for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.inner.name, self.inner.msp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_debug_is_redacted() {
        let identity = Identity::new("admin", "cert", "super-secret", "Org1MSP");
        let rendered = format!("{:?}", identity);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("PrivateKey(***)"));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Identity::new("admin", "cert", "k1", "Org1MSP");
        let b = Identity::new("other", "cert", "k2", "Org2MSP");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_signing_identity_display() {
        let signing = SigningIdentity::new(Identity::new("admin", "cert", "k", "Org1MSP"));
        assert_eq!(signing.to_string(), "admin@Org1MSP");
        assert_eq!(signing.short_fingerprint().len(), 16);
    }
}
