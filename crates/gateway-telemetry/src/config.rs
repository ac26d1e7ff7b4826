//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging and metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression)
    pub log_level: String,

    /// Whether to write logs to the console
    pub console_output: bool,

    /// Whether to format logs as JSON
    pub json_logs: bool,

    /// Whether to register the Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "chaincode-gateway".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

fn flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CG_SERVICE_NAME`: Service name (default: chaincode-gateway)
    /// - `CG_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `CG_CONSOLE_OUTPUT`: Console output (default: true)
    /// - `CG_JSON_LOGS`: JSON logs (default: true inside containers)
    /// - `CG_METRICS`: Register metrics (default: true)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        let mut config = Self {
            json_logs: is_container,
            ..Self::default()
        };
        config.apply_env();
        config
    }

    /// Override fields that are set in the environment.
    pub fn apply_env(&mut self) {
        if let Ok(name) = env::var("CG_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Ok(level) = env::var("CG_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
            self.log_level = level;
        }
        if let Some(console) = env::var("CG_CONSOLE_OUTPUT").ok().and_then(|v| flag(&v)) {
            self.console_output = console;
        }
        if let Some(json) = env::var("CG_JSON_LOGS").ok().and_then(|v| flag(&v)) {
            self.json_logs = json;
        }
        if let Some(metrics) = env::var("CG_METRICS").ok().and_then(|v| flag(&v)) {
            self.metrics_enabled = metrics;
        }
    }
}
