//! Transaction Orchestrator Service
//!
//! Drives `Building -> Endorsing -> Endorsed -> Ordering -> AwaitingCommit
//! -> Committed` (or `Failed`) for every ledger-mutating call.

use crate::config::OrchestratorConfig;
use crate::domain::{
    validate_endorsements, ChaincodeDeployment, ChaincodePackage, EndorsementResult,
    InvokeRequest, OrchestratorError, TransactionContext, TransactionOutput,
};
use crate::ports::inbound::TransactionOrchestratorApi;
use async_trait::async_trait;
use cg_01_node_registry::NodeRegistryApi;
use cg_02_identity_context::{IdentityContextApi, IdentityScope};
use cg_03_channel_topology::{
    Channel, ChannelTopologyApi, EventError, OrdererBinding, RepresentativePeer, TopologyError,
};
use shared_bus::{EventPublisher, GatewayEvent, NoopPublisher};
use shared_types::{BroadcastRequest, Proposal, ProposalKind, TransactionId, TransactionState};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// System function every contract answers with its metadata.
pub const METADATA_FUNCTION: &str = "org.hyperledger.fabric:GetMetadata";

/// Status reported when the orderer could not be reached at all.
const ORDERER_UNREACHABLE: &str = "SERVICE_UNAVAILABLE";

/// Proposal fields known before the transaction ID exists.
struct PendingProposal {
    kind: ProposalKind,
    chaincode: String,
    version: String,
    function: String,
    args: Vec<String>,
    transient: BTreeMap<String, Vec<u8>>,
    endorsement_policy: Option<String>,
    collections_config: Option<String>,
}

impl PendingProposal {
    fn deployment(kind: ProposalKind, deployment: ChaincodeDeployment) -> Self {
        Self {
            kind,
            chaincode: deployment.name,
            version: deployment.version,
            function: deployment.function,
            args: deployment.args,
            transient: BTreeMap::new(),
            endorsement_policy: deployment.endorsement_policy,
            collections_config: deployment.collections_config,
        }
    }

    fn invocation(kind: ProposalKind, request: InvokeRequest) -> Self {
        Self {
            kind,
            chaincode: request.chaincode,
            version: String::new(),
            function: request.function,
            args: request.args,
            transient: request.transient,
            endorsement_policy: None,
            collections_config: None,
        }
    }

    fn context(&self, tx_id: TransactionId, channel: &str, peer: &str, orderer: &str) -> TransactionContext {
        TransactionContext::new(tx_id, &self.chaincode, channel, peer, orderer)
            .with_version(&self.version)
            .with_call(&self.function, self.args.clone())
    }

    fn into_proposal(self, tx_id: TransactionId, channel: &str) -> Proposal {
        Proposal::new(tx_id, self.kind, self.chaincode)
            .on_channel(channel)
            .with_version(self.version)
            .with_call(self.function, self.args)
            .with_transient(self.transient)
            .with_deployment_options(self.endorsement_policy, self.collections_config)
    }
}

/// Executes chaincode lifecycle operations and invocations.
pub struct TransactionOrchestrator {
    registry: Arc<dyn NodeRegistryApi>,
    identities: Arc<dyn IdentityContextApi>,
    topology: Arc<dyn ChannelTopologyApi>,
    config: OrchestratorConfig,
    publisher: Arc<dyn EventPublisher>,
}

impl TransactionOrchestrator {
    /// Create an orchestrator with default configuration.
    pub fn new(
        registry: Arc<dyn NodeRegistryApi>,
        identities: Arc<dyn IdentityContextApi>,
        topology: Arc<dyn ChannelTopologyApi>,
    ) -> Self {
        Self::with_config(
            registry,
            identities,
            topology,
            OrchestratorConfig::default(),
            Arc::new(NoopPublisher),
        )
    }

    /// Create an orchestrator with explicit configuration and publisher.
    pub fn with_config(
        registry: Arc<dyn NodeRegistryApi>,
        identities: Arc<dyn IdentityContextApi>,
        topology: Arc<dyn ChannelTopologyApi>,
        config: OrchestratorConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            identities,
            topology,
            config,
            publisher,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn representative(channel: &Channel) -> Result<RepresentativePeer, OrchestratorError> {
        channel
            .representative()
            .ok_or_else(|| TopologyError::ChannelNotFound(channel.name().to_string()).into())
    }

    /// Whether `chaincode` is instantiated on `channel`, asked of the
    /// representative peer.
    async fn is_instantiated(&self, channel: &Channel, chaincode: &str) -> Result<bool, OrchestratorError> {
        let peer = Self::representative(channel)?;
        let scope = self.identities.scope(&peer.name).await?;
        let instantiated = peer
            .client
            .query_instantiated_chaincodes(scope.identity(), channel.name())
            .await
            .map_err(|source| OrchestratorError::PeerQuery {
                peer: peer.name.clone(),
                source,
            })?;
        Ok(instantiated.iter().any(|info| info.name == chaincode))
    }

    async fn advance(
        &self,
        ctx: &mut TransactionContext,
        next: TransactionState,
    ) -> Result<(), OrchestratorError> {
        let from = ctx.transition(next)?;
        debug!(tx_id = %ctx.tx_id, from = %from, to = %next, "Transaction state changed");
        self.publisher
            .publish(GatewayEvent::TransactionStateChanged {
                tx_id: ctx.tx_id.clone(),
                chaincode: ctx.chaincode.clone(),
                from,
                to: next,
            })
            .await;
        Ok(())
    }

    /// Run the endorse, order, commit sequence on `channel`.
    async fn submit(
        &self,
        channel: &Channel,
        pending: PendingProposal,
    ) -> Result<TransactionOutput, OrchestratorError> {
        let peer = Self::representative(channel)?;
        let orderer = channel.orderer().clone();

        let scope = self.identities.scope(&peer.name).await?;
        let tx_id = TransactionId::generate(scope.identity().identity());
        let mut ctx = pending.context(tx_id.clone(), channel.name(), &peer.name, &orderer.name);
        let proposal = pending.into_proposal(tx_id, channel.name());

        let result = self.drive(&mut ctx, scope, &peer, &orderer, proposal).await;

        let error = match &result {
            Ok(_) => {
                info!(
                    tx_id = %ctx.tx_id,
                    chaincode = %ctx.chaincode,
                    channel = %ctx.channel,
                    peer = %ctx.peer,
                    "Transaction committed"
                );
                None
            }
            Err(err) => {
                if let Some(from) = ctx.fail() {
                    self.publisher
                        .publish(GatewayEvent::TransactionStateChanged {
                            tx_id: ctx.tx_id.clone(),
                            chaincode: ctx.chaincode.clone(),
                            from,
                            to: TransactionState::Failed,
                        })
                        .await;
                }
                warn!(
                    tx_id = %ctx.tx_id,
                    chaincode = %ctx.chaincode,
                    channel = %ctx.channel,
                    error = %err,
                    "Transaction failed"
                );
                Some(err.to_string())
            }
        };

        self.publisher
            .publish(GatewayEvent::TransactionCompleted {
                tx_id: ctx.tx_id.clone(),
                chaincode: ctx.chaincode.clone(),
                state: ctx.state(),
                error,
            })
            .await;
        result
    }

    async fn drive(
        &self,
        ctx: &mut TransactionContext,
        scope: IdentityScope,
        peer: &RepresentativePeer,
        orderer: &OrdererBinding,
        proposal: Proposal,
    ) -> Result<TransactionOutput, OrchestratorError> {
        // Endorsement
        self.advance(ctx, TransactionState::Endorsing).await?;
        let response = peer.client.send_proposal(scope.identity(), &proposal).await;
        drop(scope);

        let endorsements = validate_endorsements(
            &ctx.tx_id,
            vec![EndorsementResult::new(&peer.name, response)],
            self.config.proposal_success_status,
        )?;
        self.advance(ctx, TransactionState::Endorsed).await?;

        // Ordering. The listener must exist before the broadcast.
        self.advance(ctx, TransactionState::Ordering).await?;
        let mut listener = {
            let scope = self.identities.scope(&peer.name).await?;
            peer.subscription
                .register(scope.identity(), &ctx.tx_id)
                .await
                .map_err(|source| OrchestratorError::EventSubscription {
                    tx_id: ctx.tx_id.clone(),
                    peer: peer.name.clone(),
                    source,
                })?
        };

        let payload = endorsements.payload().to_vec();
        let request = BroadcastRequest {
            tx_id: ctx.tx_id.clone(),
            channel: ctx.channel.clone(),
            proposal,
            endorsements: endorsements.into_responses(),
        };
        let acknowledgement = {
            let scope = self.identities.scope(&peer.name).await?;
            orderer.client.broadcast(scope.identity(), &request).await
        };

        let rejection = match acknowledgement {
            Ok(ack) if ack.status == self.config.broadcast_success_status => None,
            Ok(ack) => Some((ack.status, ack.info)),
            Err(source) => Some((ORDERER_UNREACHABLE.to_string(), source.to_string())),
        };
        if let Some((status, info)) = rejection {
            peer.subscription.unregister(&ctx.tx_id);
            return Err(OrchestratorError::Ordering {
                tx_id: ctx.tx_id.clone(),
                orderer: orderer.name.clone(),
                status,
                info,
            });
        }
        debug!(tx_id = %ctx.tx_id, orderer = %orderer.name, "Broadcast accepted");

        // Commit
        self.advance(ctx, TransactionState::AwaitingCommit).await?;
        let outcome = match self.config.commit_timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, listener.wait()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    peer.subscription.unregister(&ctx.tx_id);
                    return Err(OrchestratorError::CommitTimeout {
                        tx_id: ctx.tx_id.clone(),
                        peer: peer.name.clone(),
                        timeout,
                    });
                }
            },
            None => listener.wait().await,
        };

        match outcome {
            Ok(event) => {
                debug!(tx_id = %ctx.tx_id, block = event.block_number, "Commit event received");
            }
            Err(EventError::Invalid {
                validation_code, ..
            }) => {
                return Err(OrchestratorError::CommitValidation {
                    tx_id: ctx.tx_id.clone(),
                    peer: peer.name.clone(),
                    validation_code,
                });
            }
            Err(source) => {
                return Err(OrchestratorError::EventSubscription {
                    tx_id: ctx.tx_id.clone(),
                    peer: peer.name.clone(),
                    source,
                });
            }
        }

        self.advance(ctx, TransactionState::Committed).await?;
        Ok(TransactionOutput::from_payload(payload))
    }

    async fn deploy(
        &self,
        kind: ProposalKind,
        deployment: ChaincodeDeployment,
    ) -> Result<TransactionOutput, OrchestratorError> {
        let channel = self.topology.channel_or_discover(&deployment.channel).await?;

        let exists = self.is_instantiated(&channel, &deployment.name).await?;
        match kind {
            ProposalKind::Instantiate if exists => {
                return Err(OrchestratorError::AlreadyInstantiated {
                    chaincode: deployment.name,
                    channel: deployment.channel,
                });
            }
            ProposalKind::Upgrade if !exists => {
                return Err(OrchestratorError::NotInstantiated {
                    chaincode: deployment.name,
                    channel: deployment.channel,
                });
            }
            _ => {}
        }

        info!(
            chaincode = %deployment.name,
            version = %deployment.version,
            channel = %deployment.channel,
            ?kind,
            "Deploying chaincode"
        );
        self.submit(&channel, PendingProposal::deployment(kind, deployment))
            .await
    }
}

#[async_trait]
impl TransactionOrchestratorApi for TransactionOrchestrator {
    async fn install_chaincode(
        &self,
        package: ChaincodePackage,
        peer: &str,
    ) -> Result<(), OrchestratorError> {
        let client = self.registry.peer_client(peer)?;

        let response = {
            let scope = self.identities.scope(peer).await?;
            let tx_id = TransactionId::generate(scope.identity().identity());
            let proposal = Proposal::new(tx_id, ProposalKind::Install, &package.name)
                .with_version(&package.version)
                .with_package(package.bytes);
            client.send_proposal(scope.identity(), &proposal).await
        };

        let message = match response {
            Ok(response) if response.status == self.config.proposal_success_status => {
                info!(peer, chaincode = %package.name, version = %package.version, "Chaincode installed");
                return Ok(());
            }
            Ok(response) => format!("status {}: {}", response.status, response.message),
            Err(source) => source.to_string(),
        };
        Err(OrchestratorError::Install {
            peer: peer.to_string(),
            message,
        })
    }

    async fn instantiate_chaincode(
        &self,
        deployment: ChaincodeDeployment,
    ) -> Result<TransactionOutput, OrchestratorError> {
        self.deploy(ProposalKind::Instantiate, deployment).await
    }

    async fn upgrade_chaincode(
        &self,
        deployment: ChaincodeDeployment,
    ) -> Result<TransactionOutput, OrchestratorError> {
        self.deploy(ProposalKind::Upgrade, deployment).await
    }

    async fn submit_transaction(
        &self,
        request: InvokeRequest,
    ) -> Result<TransactionOutput, OrchestratorError> {
        let channel = self.topology.channel_or_discover(&request.channel).await?;
        self.submit(&channel, PendingProposal::invocation(ProposalKind::Invoke, request))
            .await
    }

    async fn evaluate_transaction(
        &self,
        request: InvokeRequest,
    ) -> Result<TransactionOutput, OrchestratorError> {
        let channel = self.topology.channel_or_discover(&request.channel).await?;
        let peer = Self::representative(&channel)?;

        let response = {
            let scope = self.identities.scope(&peer.name).await?;
            let tx_id = TransactionId::generate(scope.identity().identity());
            let proposal = PendingProposal::invocation(ProposalKind::Query, request)
                .into_proposal(tx_id, channel.name());
            debug!(peer = %peer.name, tx_id = %proposal.tx_id, function = %proposal.function, "Evaluating");
            peer.client.send_proposal(scope.identity(), &proposal).await
        };

        match response {
            Ok(response) if response.status == self.config.proposal_success_status => {
                Ok(TransactionOutput::from_payload(response.payload))
            }
            Ok(response) => Err(OrchestratorError::Evaluation {
                peer: peer.name,
                message: format!("status {}: {}", response.status, response.message),
            }),
            Err(source) => Err(OrchestratorError::Evaluation {
                peer: peer.name,
                message: source.to_string(),
            }),
        }
    }

    async fn get_chaincode_metadata(
        &self,
        channel: &str,
        chaincode: &str,
    ) -> Result<serde_json::Value, OrchestratorError> {
        let output = self
            .evaluate_transaction(InvokeRequest::new(channel, chaincode, METADATA_FUNCTION, Vec::new()))
            .await?;

        let Some(bytes) = output.payload() else {
            return Err(OrchestratorError::Metadata {
                chaincode: chaincode.to_string(),
                message: "chaincode returned no metadata".to_string(),
            });
        };
        serde_json::from_slice(bytes).map_err(|err| OrchestratorError::Metadata {
            chaincode: chaincode.to_string(),
            message: err.to_string(),
        })
    }
}
