//! # Wallet Port
//!
//! Wallets store identities on behalf of the user. The gateway only reads
//! identities from them (and imports freshly enrolled ones); it never
//! persists identity material itself.

use crate::errors::WalletError;
use crate::identity::Identity;
use async_trait::async_trait;

/// An identity store.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Wallet name, as referenced by node descriptors.
    fn name(&self) -> &str;

    /// Fetch the identity labelled `name`.
    async fn get_identity(&self, name: &str) -> Result<Identity, WalletError>;

    /// Store an identity under `name`.
    async fn import_identity(
        &self,
        certificate: &str,
        private_key: &str,
        name: &str,
        msp_id: &str,
    ) -> Result<(), WalletError>;

    /// Whether an identity labelled `name` exists.
    async fn exists(&self, name: &str) -> Result<bool, WalletError>;
}
