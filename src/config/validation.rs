//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Contract address and RPC URL must parse
//! - Validate value ranges (confirmations ≥ 1, minimum ≥ 0.001 ETH)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FundMeConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use alloy::primitives::Address;

use crate::config::schema::FundMeConfig;
use crate::session::amount::MINIMUM_FUND_ETH;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &FundMeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.contract.address.trim().is_empty() {
        errors.push(ValidationError::new("contract.address", "must be set"));
    } else if let Err(e) = config.contract.address.parse::<Address>() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("not an address: {}", e),
        ));
    }

    if let Err(e) = url::Url::parse(&config.network.rpc_url) {
        errors.push(ValidationError::new("network.rpc_url", format!("invalid URL: {}", e)));
    }

    if config.network.confirmations == 0 {
        errors.push(ValidationError::new("network.confirmations", "must be at least 1"));
    }

    let minimum = config.funding.minimum_eth;
    if !minimum.is_finite() || minimum <= 0.0 {
        errors.push(ValidationError::new("funding.minimum_eth", "must be a positive number"));
    } else if minimum < MINIMUM_FUND_ETH {
        errors.push(ValidationError::new(
            "funding.minimum_eth",
            format!("must be at least {} ETH", MINIMUM_FUND_ETH),
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
