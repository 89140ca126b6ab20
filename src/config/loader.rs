//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::FundMeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `contract.address`.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "FUNDME_CONTRACT_ADDRESS";
/// Overrides `network.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "FUNDME_RPC_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// Single-field validation failure.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Validation(vec![ValidationError::new(field, message)])
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FundMeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: FundMeConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the file if it exists, otherwise start from defaults.
///
/// Environment overrides apply either way.
pub fn load_config_or_default(path: &Path) -> Result<FundMeConfig, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "Config file not found, using defaults");
    let mut config = FundMeConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `FUNDME_*` overrides looked up through `lookup`.
pub fn apply_env_overrides(config: &mut FundMeConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(address) = lookup(CONTRACT_ADDRESS_ENV_VAR) {
        config.contract.address = address;
    }
    if let Some(url) = lookup(RPC_URL_ENV_VAR) {
        config.network.rpc_url = url;
    }
}
