//! # CG-04: Certificate Authority Subsystem
//!
//! Enrollment and registration against CA nodes from the registry.
//!
//! Registration runs under the CA node's configured identity (the
//! registrar), bound through the identity context. CA failures reach the
//! caller with the CA's own message.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::CertificateAuthorityError;
pub use ports::CertificateAuthorityApi;
pub use service::CertificateAuthorityService;
