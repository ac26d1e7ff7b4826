//! # CG-02: Identity Context Subsystem
//!
//! Binds the signing identity a node's descriptor names (wallet + label) to
//! that node's signing context before any call addressed to the node.
//!
//! ## Isolation
//!
//! Each node owns its own context, guarded by its own async mutex. A call
//! against a node runs inside an `IdentityScope`, which holds that node's
//! context for the whole "switch identity; perform call" unit:
//!
//! ```text
//! scope(peer0) ──► lookup node ──► lock ctx[peer0] ──► wallet.get_identity
//!                                                            │
//!                       call(scope.identity()) ◄─────────────┘
//!                       drop(scope) ──► unlock ctx[peer0]
//! ```
//!
//! Units against different nodes run in parallel; units against the same
//! node serialize.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryWallet, WalletDirectory};
pub use domain::{IdentityError, IdentityScope, NodeContext};
pub use ports::{IdentityContextApi, WalletProvider};
pub use service::IdentityContextSwitcher;
