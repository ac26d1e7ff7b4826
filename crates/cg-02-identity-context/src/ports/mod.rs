//! Ports module for the identity context

pub mod inbound;
pub mod outbound;

pub use inbound::IdentityContextApi;
pub use outbound::WalletProvider;
