// crates/harvest-daemon/src/config.rs
//
// Runtime configuration for the Harvest daemon.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use harvest_core::error::HarvestError;
use harvest_core::params::ProtocolParams;
use harvest_core::{Address, Amount};
use harvest_runtime::GenesisConfig;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Governance owner. Required only when no snapshot exists yet.
    #[serde(default)]
    pub owner: Option<Address>,

    /// Account allowed to report purchases; defaults to the owner.
    #[serde(default)]
    pub marketplace_operator: Option<Address>,

    #[serde(default)]
    pub settlement_supply: Amount,

    /// Part of the supply moved to governance holdings at genesis.
    #[serde(default)]
    pub governance_allocation: Amount,

    #[serde(default)]
    pub protocol: ProtocolParams,
}

fn default_data_dir() -> String {
    "~/.harvest/data".to_string()
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50061
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            owner: None,
            marketplace_operator: None,
            settlement_supply: 0,
            governance_allocation: 0,
            protocol: ProtocolParams::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Genesis parameters for a node starting without a snapshot.
    pub fn genesis(&self) -> Result<GenesisConfig, HarvestError> {
        let owner = self.owner.ok_or_else(|| {
            HarvestError::Config("`owner` must be set to start a new platform".to_string())
        })?;
        let genesis = GenesisConfig {
            owner,
            marketplace_operator: self.marketplace_operator,
            settlement_supply: self.settlement_supply,
            governance_allocation: self.governance_allocation,
            params: self.protocol.clone(),
        };
        genesis.validate()?;
        Ok(genesis)
    }
}
