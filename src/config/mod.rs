//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + FUNDME_* environment overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FundMeConfig (validated, immutable)
//!     → SessionSettings for the controller
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::{
    ContractConfig, FundMeConfig, FundingConfig, NetworkConfig, ObservabilityConfig, UiConfig,
};
pub use validation::{validate_config, ValidationError};
