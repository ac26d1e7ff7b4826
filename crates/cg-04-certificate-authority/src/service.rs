//! Certificate Authority Service

use crate::domain::CertificateAuthorityError;
use crate::ports::inbound::CertificateAuthorityApi;
use async_trait::async_trait;
use cg_01_node_registry::NodeRegistryApi;
use cg_02_identity_context::{IdentityContextApi, WalletProvider};
use shared_bus::{CaOperation, EventPublisher, GatewayEvent, NoopPublisher};
use shared_types::{Enrollment, Identity, RegistrationRequest};
use std::sync::Arc;
use tracing::{info, warn};

/// Enroll/register against CA nodes.
pub struct CertificateAuthorityService {
    registry: Arc<dyn NodeRegistryApi>,
    identities: Arc<dyn IdentityContextApi>,
    wallets: Arc<dyn WalletProvider>,
    publisher: Arc<dyn EventPublisher>,
}

impl CertificateAuthorityService {
    /// Create the service.
    pub fn new(
        registry: Arc<dyn NodeRegistryApi>,
        identities: Arc<dyn IdentityContextApi>,
        wallets: Arc<dyn WalletProvider>,
    ) -> Self {
        Self::with_publisher(registry, identities, wallets, Arc::new(NoopPublisher))
    }

    /// Create the service reporting operations on `publisher`.
    pub fn with_publisher(
        registry: Arc<dyn NodeRegistryApi>,
        identities: Arc<dyn IdentityContextApi>,
        wallets: Arc<dyn WalletProvider>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            identities,
            wallets,
            publisher,
        }
    }

    async fn report(&self, ca: &str, operation: CaOperation, enrollment_id: &str, success: bool) {
        self.publisher
            .publish(GatewayEvent::CertificateAuthorityOperation {
                ca: ca.to_string(),
                operation,
                enrollment_id: enrollment_id.to_string(),
                success,
            })
            .await;
    }
}

#[async_trait]
impl CertificateAuthorityApi for CertificateAuthorityService {
    async fn enroll(
        &self,
        ca: &str,
        enrollment_id: &str,
        secret: &str,
    ) -> Result<Enrollment, CertificateAuthorityError> {
        let client = self.registry.ca_client(ca)?;

        let result = client.enroll(enrollment_id, secret).await;
        self.report(ca, CaOperation::Enroll, enrollment_id, result.is_ok())
            .await;

        match result {
            Ok(enrollment) => {
                info!(ca, enrollment_id, "Enrolled");
                Ok(enrollment)
            }
            Err(source) => {
                warn!(ca, enrollment_id, error = %source, "Enrollment rejected");
                Err(CertificateAuthorityError::CertificateAuthority {
                    ca: ca.to_string(),
                    source,
                })
            }
        }
    }

    async fn register(
        &self,
        ca: &str,
        enrollment_id: &str,
        affiliation: &str,
    ) -> Result<String, CertificateAuthorityError> {
        self.register_with(ca, RegistrationRequest::new(enrollment_id, affiliation))
            .await
    }

    async fn register_with(
        &self,
        ca: &str,
        request: RegistrationRequest,
    ) -> Result<String, CertificateAuthorityError> {
        let client = self.registry.ca_client(ca)?;

        let result = {
            let scope = self.identities.scope(ca).await?;
            client.register(scope.identity(), &request).await
        };
        self.report(ca, CaOperation::Register, &request.enrollment_id, result.is_ok())
            .await;

        match result {
            Ok(secret) => {
                info!(
                    ca,
                    enrollment_id = %request.enrollment_id,
                    affiliation = %request.affiliation,
                    "Registered"
                );
                Ok(secret)
            }
            Err(source) => {
                warn!(ca, enrollment_id = %request.enrollment_id, error = %source, "Registration rejected");
                Err(CertificateAuthorityError::CertificateAuthority {
                    ca: ca.to_string(),
                    source,
                })
            }
        }
    }

    async fn enroll_into_wallet(
        &self,
        ca: &str,
        enrollment_id: &str,
        secret: &str,
        wallet: &str,
        identity_name: &str,
        msp_id: &str,
    ) -> Result<Identity, CertificateAuthorityError> {
        let target = self
            .wallets
            .wallet(wallet)
            .ok_or_else(|| CertificateAuthorityError::WalletNotFound(wallet.to_string()))?;

        let enrollment = self.enroll(ca, enrollment_id, secret).await?;
        target
            .import_identity(
                &enrollment.certificate,
                enrollment.private_key.expose(),
                identity_name,
                msp_id,
            )
            .await?;

        info!(ca, wallet, identity = identity_name, "Enrolled identity imported");
        Ok(Identity {
            name: identity_name.to_string(),
            certificate: enrollment.certificate,
            private_key: enrollment.private_key,
            msp_id: msp_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_01_node_registry::NodeRegistry;
    use cg_02_identity_context::{IdentityContextSwitcher, InMemoryWallet, WalletDirectory};
    use ledger_simnet::SimulatedNetwork;
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::{Node, RegistrationAttribute, Wallet};

    struct Fixture {
        service: CertificateAuthorityService,
        wallet: Arc<InMemoryWallet>,
        bus: Arc<InMemoryEventBus>,
    }

    async fn fixture() -> Fixture {
        let network = SimulatedNetwork::new();
        network.add_ca_user("ca0", "admin", "adminpw");

        let registry = Arc::new(NodeRegistry::new(Arc::new(network)));
        registry
            .load(vec![
                Node::certificate_authority("ca0", "http://localhost:7054", "org1", "admin"),
                Node::peer("peer0", "grpc://localhost:7051", "org1", "admin"),
            ])
            .await
            .unwrap();

        let wallet = Arc::new(
            InMemoryWallet::new("org1").with_identity(Identity::new("admin", "cert", "key", "Org1MSP")),
        );
        let wallets = Arc::new(WalletDirectory::new().with_wallet(wallet.clone()));
        let switcher = Arc::new(IdentityContextSwitcher::new(registry.clone(), wallets.clone()));
        let bus = Arc::new(InMemoryEventBus::new());

        Fixture {
            service: CertificateAuthorityService::with_publisher(registry, switcher, wallets, bus.clone()),
            wallet,
            bus,
        }
    }

    #[tokio::test]
    async fn test_enroll_returns_material() {
        let f = fixture().await;
        let enrollment = f.service.enroll("ca0", "admin", "adminpw").await.unwrap();
        assert!(enrollment.certificate.contains("admin@ca0"));
        assert!(!enrollment.private_key.is_empty());
    }

    #[tokio::test]
    async fn test_bad_credentials_pass_through() {
        let f = fixture().await;
        let err = f.service.enroll("ca0", "admin", "wrong").await.unwrap_err();
        assert!(matches!(err, CertificateAuthorityError::CertificateAuthority { .. }));
        assert_eq!(err.to_string(), "Authentication failure for enrollment ID 'admin'");
    }

    #[tokio::test]
    async fn test_register_then_enroll() {
        let f = fixture().await;
        let secret = f.service.register("ca0", "user1", "org1.department1").await.unwrap();
        assert!(f.service.enroll("ca0", "user1", &secret).await.is_ok());

        let err = f.service.register("ca0", "user1", "org1.department1").await.unwrap_err();
        assert_eq!(err.to_string(), "Identity 'user1' is already registered");
    }

    #[tokio::test]
    async fn test_register_with_attributes() {
        let f = fixture().await;
        let mut request = RegistrationRequest::new("user2", "org1");
        request.role = Some("client".into());
        request.max_enrollments = Some(1);
        request.attributes.push(RegistrationAttribute {
            name: "hf.Revoker".into(),
            value: "true".into(),
            ecert: true,
        });

        assert!(f.service.register_with("ca0", request).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_ca_node_is_refused() {
        let f = fixture().await;
        let err = f.service.enroll("peer0", "admin", "adminpw").await.unwrap_err();
        assert!(matches!(err, CertificateAuthorityError::Registry(_)));

        let err = f.service.register("ghost", "user1", "org1").await.unwrap_err();
        assert!(matches!(err, CertificateAuthorityError::Registry(inner) if inner.is_not_found()));
    }

    #[tokio::test]
    async fn test_enroll_into_wallet() {
        let f = fixture().await;
        let identity = f
            .service
            .enroll_into_wallet("ca0", "admin", "adminpw", "org1", "ca-admin", "Org1MSP")
            .await
            .unwrap();

        assert_eq!(identity.name, "ca-admin");
        assert!(f.wallet.exists("ca-admin").await.unwrap());

        let err = f
            .service
            .enroll_into_wallet("ca0", "admin", "adminpw", "nowhere", "x", "Org1MSP")
            .await
            .unwrap_err();
        assert!(matches!(err, CertificateAuthorityError::WalletNotFound(name) if name == "nowhere"));
    }

    #[tokio::test]
    async fn test_operations_are_published() {
        let f = fixture().await;
        let mut sub = f
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::CertificateAuthority]));

        f.service.enroll("ca0", "admin", "adminpw").await.unwrap();
        let _ = f.service.enroll("ca0", "admin", "nope").await;

        let outcomes: Vec<bool> = sub
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                GatewayEvent::CertificateAuthorityOperation { success, .. } => Some(success),
                _ => None,
            })
            .collect();
        assert_eq!(outcomes, vec![true, false]);
    }
}
