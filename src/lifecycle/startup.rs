//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging
//! - Load the local wallet (optional) and verify its chain
//! - Build the session controller and run the page-load connection check

use std::path::Path;

use crate::blockchain::{ChainId, LocalWalletProvider};
use crate::config::{load_config_or_default, ConfigError, FundMeConfig};
use crate::observability::logging;
use crate::session::{SessionController, SessionSettings};

/// Controller wired to the local-key wallet.
pub type LocalController = SessionController<LocalWalletProvider>;

/// Load config from `path` (defaults if absent) and start logging.
pub fn load(path: &Path) -> Result<FundMeConfig, ConfigError> {
    let config = load_config_or_default(path)?;
    logging::init_logging(&config.observability);
    tracing::info!(
        contract = %config.contract.address,
        rpc_url = %config.network.rpc_url,
        chain_id = config.network.chain_id,
        "Configuration loaded"
    );
    Ok(config)
}

/// Build the controller and run the start-up connection check.
///
/// A missing or broken wallet leaves the controller without a provider;
/// actions then report the provider as unavailable.
pub async fn start(config: &FundMeConfig) -> Result<LocalController, ConfigError> {
    let settings = SessionSettings::from_config(config)?;

    let wallet = match LocalWalletProvider::from_env(&config.network.rpc_url) {
        Ok(wallet) => {
            // Chain mismatch is only a warning: the wallet may switch later.
            if let Err(e) = wallet.verify_chain_id(ChainId(config.network.chain_id)).await {
                tracing::warn!(error = %e, "Wallet initialized but chain verification failed");
            }
            Some(wallet)
        }
        Err(e) => {
            tracing::warn!(error = %e, "No wallet available");
            None
        }
    };

    let controller = SessionController::new(wallet, settings);
    controller.check_connection().await;
    Ok(controller)
}
