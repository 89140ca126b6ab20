//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private keys) + config (RPC URL, contract address)
//!     → wallet.rs (accounts, signers, wallet notifications)
//!     → contract.rs (FundMe binding: reads, fund, cheaperWithdraw, confirmations)
//!     → provider.rs traits consumed by the session controller
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data

pub mod contract;
pub mod provider;
pub mod types;
pub mod wallet;

pub use contract::FundMeContract;
pub use provider::{AccountSigner, ContractProxy, PendingTx, ProviderEvent, WalletProvider};
pub use types::{ChainId, ProviderError, ProviderResult, WalletError};
pub use wallet::LocalWalletProvider;
