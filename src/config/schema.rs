//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::session::amount::MINIMUM_FUND_ETH;

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FundMeConfig {
    /// Deployed contract.
    pub contract: ContractConfig,

    /// Chain endpoint and confirmation policy.
    pub network: NetworkConfig,

    /// Client-side funding rules.
    pub funding: FundingConfig,

    /// Display settings.
    pub ui: UiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Contract location.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// FundMe contract address (0x-prefixed hex).
    pub address: String,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (e.g., 11155111 for Sepolia, 31337 for local Anvil).
    pub chain_id: u64,

    /// Confirmations to wait for after submitting a transaction.
    pub confirmations: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            confirmations: 1,
        }
    }
}

/// Funding rules enforced before submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FundingConfig {
    /// Smallest amount accepted, in ETH. May be raised, never below 0.001.
    pub minimum_eth: f64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self { minimum_eth: MINIMUM_FUND_ETH }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long a notification stays visible, in milliseconds.
    pub notification_ttl_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ttl_ms: 5000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
