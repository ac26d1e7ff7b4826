//! Outbound Ports (Driven Ports / SPI)

use shared_types::Wallet;
use std::sync::Arc;

/// Resolves wallet names (as written in node descriptors) to wallets.
pub trait WalletProvider: Send + Sync {
    /// The wallet called `name`.
    fn wallet(&self, name: &str) -> Option<Arc<dyn Wallet>>;

    /// Names of every wallet on offer, sorted.
    fn wallet_names(&self) -> Vec<String>;
}
