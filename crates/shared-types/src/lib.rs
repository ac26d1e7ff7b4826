//! # Shared Types Crate
//!
//! This crate contains the network node model, signing identities and the
//! protocol surface every subsystem talks through.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Opaque Transport**: Proposal send, broadcast send and commit-event
//!   feeds are expressed as request/response and publish/subscribe ports
//!   (`protocol`), never as a concrete wire format.
//! - **Explicit Signing Context**: Every network call takes the
//!   `SigningIdentity` it runs under; there is no hidden mutable client state.

pub mod entities;
pub mod errors;
pub mod identity;
pub mod protocol;
pub mod wallet;

pub use entities::*;
pub use errors::*;
pub use identity::*;
pub use protocol::*;
pub use wallet::*;
