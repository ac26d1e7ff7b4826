//! # Domain Module
//!
//! Core domain types for channel topology.

pub mod channel;
pub mod errors;
pub mod snapshot;
pub mod subscription;

pub use channel::*;
pub use errors::*;
pub use snapshot::*;
pub use subscription::*;
