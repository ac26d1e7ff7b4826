//! # Domain Module
//!
//! Core domain types for the identity context.

pub mod errors;
pub mod scope;

pub use errors::*;
pub use scope::*;
