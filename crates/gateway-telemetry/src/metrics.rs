//! Prometheus metrics for the chaincode gateway.
//!
//! All metrics follow the naming convention: `cg_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., transactions_total)
//! - **Gauge**: Value that can go up or down (e.g., registered_nodes)
//! - **Histogram**: Distribution of values (e.g., transaction_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // REGISTRY METRICS (Subsystem 1)
    // =========================================================================

    /// Nodes in the registry
    pub static ref REGISTERED_NODES: Gauge = Gauge::new(
        "cg_registry_nodes",
        "Number of nodes currently loaded in the registry"
    ).expect("metric creation failed");

    // =========================================================================
    // IDENTITY METRICS (Subsystem 2)
    // =========================================================================

    /// Identity (re)bindings
    pub static ref IDENTITY_BINDINGS: Counter = Counter::new(
        "cg_identity_bindings_total",
        "Number of times a node's active signing identity changed"
    ).expect("metric creation failed");

    // =========================================================================
    // TOPOLOGY METRICS (Subsystem 3)
    // =========================================================================

    /// Discovery passes
    pub static ref DISCOVERY_PASSES: Counter = Counter::new(
        "cg_topology_discovery_passes_total",
        "Completed channel discovery passes"
    ).expect("metric creation failed");

    /// Channels in the current topology
    pub static ref CHANNELS_DISCOVERED: Gauge = Gauge::new(
        "cg_topology_channels",
        "Channels in the current topology snapshot"
    ).expect("metric creation failed");

    /// Peers that denied the channel query
    pub static ref PEERS_DENIED: Counter = Counter::new(
        "cg_topology_peers_denied_total",
        "Peers that denied access during discovery"
    ).expect("metric creation failed");

    // =========================================================================
    // CERTIFICATE AUTHORITY METRICS (Subsystem 4)
    // =========================================================================

    /// CA operations by kind and outcome
    pub static ref CA_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("cg_ca_operations_total", "Certificate authority operations"),
        &["operation", "outcome"]  // operation: enroll/register, outcome: success/failure
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSACTION METRICS (Subsystem 5)
    // =========================================================================

    /// Completed transactions by outcome
    pub static ref TRANSACTIONS: CounterVec = CounterVec::new(
        Opts::new("cg_transactions_total", "Completed transactions"),
        &["outcome"]  // outcome: committed/failed
    ).expect("metric creation failed");

    /// State machine transitions by target state
    pub static ref TRANSACTION_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("cg_transaction_transitions_total", "Transaction state transitions"),
        &["state"]
    ).expect("metric creation failed");

    /// Time from endorsement start to completion
    pub static ref TRANSACTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "cg_transaction_duration_seconds",
            "Time from proposal send to commit or failure"
        ).buckets(exponential_buckets(0.005, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // RUNTIME METRICS
    // =========================================================================

    /// Gateway busy flag
    pub static ref GATEWAY_BUSY: Gauge = Gauge::new(
        "cg_gateway_busy",
        "1 while the gateway is connecting or disconnecting"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics.
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// Prometheus text exposition of every gateway metric.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register all metrics with the global registry.
///
/// Registering twice is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Registry
        Box::new(REGISTERED_NODES.clone()),
        // Identity
        Box::new(IDENTITY_BINDINGS.clone()),
        // Topology
        Box::new(DISCOVERY_PASSES.clone()),
        Box::new(CHANNELS_DISCOVERED.clone()),
        Box::new(PEERS_DENIED.clone()),
        // Certificate authority
        Box::new(CA_OPERATIONS.clone()),
        // Transactions
        Box::new(TRANSACTIONS.clone()),
        Box::new(TRANSACTION_TRANSITIONS.clone()),
        Box::new(TRANSACTION_DURATION.clone()),
        // Runtime
        Box::new(GATEWAY_BUSY.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    encode_registry(&REGISTRY)
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_counter_increment() {
        TRANSACTIONS.with_label_values(&["committed"]).inc();
        assert!(TRANSACTIONS.with_label_values(&["committed"]).get() >= 1.0);
    }

    #[test]
    fn test_encoded_output_names_metrics() {
        let handle = register_metrics().unwrap();
        DISCOVERY_PASSES.inc();
        let text = handle.encode().unwrap();
        assert!(text.contains("cg_topology_discovery_passes_total"));
    }
}
