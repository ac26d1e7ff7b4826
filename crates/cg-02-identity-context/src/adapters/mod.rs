//! Adapters for the identity context.

pub mod wallet;

pub use wallet::{InMemoryWallet, WalletDirectory};
