//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the scout.
//! All types derive Serde traits for deserialization from config files.
//! Secrets (private key, provider API keys) never live here; they are read
//! from the environment at startup.

use serde::{Deserialize, Serialize};

/// Environment variable holding the provider key for Alchemy.
pub const ALCHEMY_API_KEY_ENV_VAR: &str = "ALCHEMY_API_KEY";

/// Environment variable holding the provider key for OpenSea.
pub const OPENSEA_API_KEY_ENV_VAR: &str = "OPENSEA_API_KEY";

/// Root configuration for the scout.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ScoutConfig {
    /// Stage timing, queue sizing and transaction gas limit.
    pub pipeline: PipelineConfig,

    /// Blockchain integration settings.
    pub blockchain: BlockchainConfig,

    /// Ledger location.
    pub storage: StorageConfig,

    /// Upstream data providers.
    pub sources: SourcesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Pipeline configuration shared by the three stages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Interval between discovery polls in seconds.
    pub poll_interval_secs: u64,

    /// Capacity of each inter-stage queue.
    pub queue_capacity: usize,

    /// Fixed gas limit applied to every mint transaction.
    pub gas_limit: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            queue_capacity: 4,
            gas_limit: 300_000,
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (8453 for Base mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum gas price in gwei. Zero disables the ceiling.
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 8453,
            rpc_timeout_secs: 10,
            max_gas_price_gwei: 500,
        }
    }
}

/// Ledger storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the ledger files.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

/// Upstream provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Alchemy NFT API base URL (the API key is appended as a path segment).
    pub alchemy_base_url: String,

    /// Owner address queried on Alchemy for newly deployed contracts.
    pub alchemy_owner: String,

    /// OpenSea API base URL.
    pub opensea_base_url: String,

    /// Chain slug passed to OpenSea.
    pub opensea_chain: String,

    /// Endpoint serving mint candidates per contract. Demo candidates when unset.
    pub candidate_api_url: Option<String>,

    /// HTTP request timeout for provider calls in seconds.
    pub request_timeout_secs: u64,

    /// Force demo collections and candidates regardless of configured keys.
    pub demo_mode: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            alchemy_base_url: "https://base-mainnet.g.alchemy.com/nft/v3".to_string(),
            alchemy_owner: "0x0000000000000000000000000000000000000000".to_string(),
            opensea_base_url: "https://api.opensea.io/api/v2".to_string(),
            opensea_chain: "base".to_string(),
            candidate_api_url: None,
            request_timeout_secs: 10,
            demo_mode: false,
        }
    }
}

impl SourcesConfig {
    /// Alchemy API key from the environment, if set and non-empty.
    pub fn alchemy_api_key(&self) -> Option<String> {
        non_empty_env(ALCHEMY_API_KEY_ENV_VAR)
    }

    /// OpenSea API key from the environment, if set and non-empty.
    pub fn opensea_api_key(&self) -> Option<String> {
        non_empty_env(OPENSEA_API_KEY_ENV_VAR)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
