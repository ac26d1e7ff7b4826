//! Ports module for certificate authority access

pub mod inbound;

pub use inbound::CertificateAuthorityApi;
