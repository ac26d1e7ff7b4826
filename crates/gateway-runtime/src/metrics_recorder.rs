//! # Metrics Recorder
//!
//! Feeds the Prometheus metrics from the gateway event bus. Subsystems never
//! touch the metrics registry; this task is the only writer.

use std::collections::HashMap;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::debug;

use gateway_telemetry::{
    log_tx_event, metric_inc, metric_observe, CA_OPERATIONS, CHANNELS_DISCOVERED, DISCOVERY_PASSES, GATEWAY_BUSY,
    IDENTITY_BINDINGS, PEERS_DENIED, REGISTERED_NODES, TRANSACTIONS, TRANSACTION_DURATION,
    TRANSACTION_TRANSITIONS,
};
use shared_bus::{CaOperation, EventFilter, GatewayEvent, InMemoryEventBus};
use shared_types::{TransactionId, TransactionState};

/// Maps gateway events onto metric updates.
#[derive(Default)]
pub struct MetricsRecorder {
    started: HashMap<TransactionId, Instant>,
}

impl MetricsRecorder {
    /// Create a recorder with no transactions in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions whose start was seen but whose completion was not.
    pub fn in_flight(&self) -> usize {
        self.started.len()
    }

    /// Apply one event.
    pub fn record(&mut self, event: &GatewayEvent) {
        match event {
            GatewayEvent::GatewayBusy { busy, .. } => {
                GATEWAY_BUSY.set(if *busy { 1.0 } else { 0.0 });
            }
            GatewayEvent::Disconnected => {
                REGISTERED_NODES.set(0.0);
                CHANNELS_DISCOVERED.set(0.0);
                self.started.clear();
            }
            GatewayEvent::RegistryLoaded { nodes } => {
                REGISTERED_NODES.set(*nodes as f64);
            }
            GatewayEvent::IdentityBound { .. } => {
                metric_inc!(IDENTITY_BINDINGS);
            }
            GatewayEvent::TopologyDiscovered {
                channels,
                peers_denied,
                ..
            } => {
                metric_inc!(DISCOVERY_PASSES);
                CHANNELS_DISCOVERED.set(channels.len() as f64);
                PEERS_DENIED.inc_by(peers_denied.len() as f64);
            }
            GatewayEvent::CertificateAuthorityOperation {
                operation, success, ..
            } => {
                let operation = match operation {
                    CaOperation::Enroll => "enroll",
                    CaOperation::Register => "register",
                };
                let outcome = if *success { "success" } else { "failure" };
                metric_inc!(CA_OPERATIONS, &[operation, outcome]);
            }
            GatewayEvent::TransactionStateChanged { tx_id, to, .. } => {
                if *to == TransactionState::Endorsing {
                    self.started.insert(tx_id.clone(), Instant::now());
                }
                metric_inc!(TRANSACTION_TRANSITIONS, &[to.to_string().as_str()]);
            }
            GatewayEvent::TransactionCompleted {
                tx_id,
                state,
                error,
                ..
            } => {
                let outcome = match state {
                    TransactionState::Committed => "committed",
                    _ => "failed",
                };
                if let Some(error) = error {
                    log_tx_event!(debug, "runtime", "Recorded failed transaction", tx_id, error = %error);
                }
                metric_inc!(TRANSACTIONS, &[outcome]);
                if let Some(started) = self.started.remove(tx_id) {
                    metric_observe!(TRANSACTION_DURATION, started.elapsed().as_secs_f64());
                }
            }
        }
    }
}

/// Spawn a task that records every event published on `bus`.
///
/// The task ends when the bus is dropped.
pub fn spawn_metrics_recorder(bus: &InMemoryEventBus) -> JoinHandle<()> {
    let mut subscription = bus.subscribe(EventFilter::all());
    tokio::spawn(async move {
        let mut recorder = MetricsRecorder::new();
        while let Some(event) = subscription.recv().await {
            recorder.record(&event);
        }
        debug!("Metrics recorder stopped");
    })
}
