//! # Gateway Configuration
//!
//! One TOML file with a section per concern, then `CG_*` environment
//! overrides:
//!
//! ```toml
//! [telemetry]
//! log_level = "debug"
//!
//! [orchestrator]
//! commit_timeout_secs = 120
//!
//! [topology]
//! orderer_selection = "first_registered"
//!
//! [nodes]
//! descriptor_dir = "./nodes"
//!
//! [devnet]
//! channels = ["mychannel"]
//! ```

use cg_03_channel_topology::TopologyConfig;
use cg_05_transaction_orchestrator::OrchestratorConfig;
use gateway_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration file {}: {source}", path.display())]
    Parse {
        /// Configuration file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// A node descriptor file is not valid JSON for the descriptor schema.
    #[error("invalid node descriptor {}: {source}", path.display())]
    Descriptor {
        /// Descriptor file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A node descriptor parsed but is incomplete.
    #[error("invalid node descriptor {}: {source}", path.display())]
    InvalidNode {
        /// Descriptor file.
        path: PathBuf,
        /// Validation error.
        #[source]
        source: shared_types::NodeValidationError,
    },

    /// An environment override has an unusable value.
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Where node descriptors come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesConfig {
    /// Directory of JSON node descriptors, one per file.
    pub descriptor_dir: Option<PathBuf>,
}

/// Simulated network settings for devnet mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevnetConfig {
    /// Run against the in-process simulated network.
    pub enabled: bool,
    /// Channels every simulated peer joins.
    pub channels: Vec<String>,
    /// MSP ID of the devnet organization.
    pub msp_id: String,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channels: vec!["mychannel".to_string()],
            msp_id: "Org1MSP".to_string(),
        }
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
    /// Transaction orchestrator.
    pub orchestrator: OrchestratorConfig,
    /// Channel discovery.
    pub topology: TopologyConfig,
    /// Node descriptors.
    pub nodes: NodesConfig,
    /// Simulated network.
    pub devnet: DevnetConfig,
}

impl GatewayConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` (or defaults when `None`) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text, path)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `CG_*` environment overrides.
    ///
    /// - `CG_NODE_DIR`: node descriptor directory
    /// - `CG_COMMIT_TIMEOUT_SECS`: commit wait bound, `0` for unbounded
    /// - `CG_DEVNET`: run against the simulated network
    /// - telemetry variables, see `TelemetryConfig::apply_env`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.telemetry.apply_env();

        if let Ok(dir) = env::var("CG_NODE_DIR") {
            self.nodes.descriptor_dir = Some(PathBuf::from(dir));
        }
        if let Ok(value) = env::var("CG_COMMIT_TIMEOUT_SECS") {
            let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CG_COMMIT_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            self.orchestrator.commit_timeout_secs = (secs > 0).then_some(secs);
        }
        if let Ok(value) = env::var("CG_DEVNET") {
            self.devnet.enabled = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "CG_DEVNET",
                        value,
                    })
                }
            };
        }
        Ok(())
    }
}
