//! # Domain Module
//!
//! Core domain types for the Node Registry.

pub mod errors;
pub mod registry;

pub use errors::*;
pub use registry::*;
