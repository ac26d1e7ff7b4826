//! Inbound Ports (Driving Ports / API)

use crate::domain::CertificateAuthorityError;
use async_trait::async_trait;
use shared_types::{Enrollment, Identity, RegistrationRequest};

/// Certificate authority API.
#[async_trait]
pub trait CertificateAuthorityApi: Send + Sync {
    /// Enroll `enrollment_id` with `secret` at CA `ca`.
    async fn enroll(
        &self,
        ca: &str,
        enrollment_id: &str,
        secret: &str,
    ) -> Result<Enrollment, CertificateAuthorityError>;

    /// Register `enrollment_id` under `affiliation`; returns the enrollment
    /// secret. The registrar is the identity configured for the CA node.
    async fn register(
        &self,
        ca: &str,
        enrollment_id: &str,
        affiliation: &str,
    ) -> Result<String, CertificateAuthorityError>;

    /// Register with role, attributes and enrollment limit.
    async fn register_with(
        &self,
        ca: &str,
        request: RegistrationRequest,
    ) -> Result<String, CertificateAuthorityError>;

    /// Enroll and import the result into `wallet` as `identity_name`.
    async fn enroll_into_wallet(
        &self,
        ca: &str,
        enrollment_id: &str,
        secret: &str,
        wallet: &str,
        identity_name: &str,
        msp_id: &str,
    ) -> Result<Identity, CertificateAuthorityError>;
}
