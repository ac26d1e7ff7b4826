//! Wallet adapters.
//!
//! `InMemoryWallet` keeps identities in process memory; `WalletDirectory`
//! maps wallet names to wallets. Persistent wallet storage is owned by the
//! host application and plugs in through the same `Wallet` trait.

use crate::ports::outbound::WalletProvider;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Identity, Wallet, WalletError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Identities held in memory.
pub struct InMemoryWallet {
    name: String,
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryWallet {
    /// Create an empty wallet called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identities: RwLock::new(HashMap::new()),
        }
    }

    /// Builder: add `identity` under its own label.
    #[must_use]
    pub fn with_identity(self, identity: Identity) -> Self {
        self.identities
            .write()
            .insert(identity.name.clone(), identity);
        self
    }

    /// Labels of stored identities, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.identities.read().keys().cloned().collect();
        labels.sort();
        labels
    }
}

#[async_trait]
impl Wallet for InMemoryWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_identity(&self, name: &str) -> Result<Identity, WalletError> {
        self.identities
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| WalletError::IdentityNotFound {
                wallet: self.name.clone(),
                name: name.to_string(),
            })
    }

    async fn import_identity(
        &self,
        certificate: &str,
        private_key: &str,
        name: &str,
        msp_id: &str,
    ) -> Result<(), WalletError> {
        let mut identities = self.identities.write();
        if identities.contains_key(name) {
            return Err(WalletError::AlreadyExists {
                wallet: self.name.clone(),
                name: name.to_string(),
            });
        }
        identities.insert(
            name.to_string(),
            Identity::new(name, certificate, private_key, msp_id),
        );
        debug!(wallet = %self.name, identity = name, msp_id, "Identity imported");
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, WalletError> {
        Ok(self.identities.read().contains_key(name))
    }
}

/// Named wallets.
#[derive(Default)]
pub struct WalletDirectory {
    wallets: RwLock<BTreeMap<String, Arc<dyn Wallet>>>,
}

impl WalletDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a wallet under its own name.
    pub fn insert(&self, wallet: Arc<dyn Wallet>) {
        self.wallets.write().insert(wallet.name().to_string(), wallet);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_wallet(self, wallet: Arc<dyn Wallet>) -> Self {
        self.insert(wallet);
        self
    }

    /// Remove the wallet called `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn Wallet>> {
        self.wallets.write().remove(name)
    }
}

impl WalletProvider for WalletDirectory {
    fn wallet(&self, name: &str) -> Option<Arc<dyn Wallet>> {
        self.wallets.read().get(name).cloned()
    }

    fn wallet_names(&self) -> Vec<String> {
        self.wallets.read().keys().cloned().collect()
    }
}
