//! # Domain Module
//!
//! Core domain types for certificate authority access.

pub mod errors;

pub use errors::*;
