//! FundMe session client library.
//!
//! Connects a wallet provider to a single FundMe contract, runs the fund /
//! withdraw / query actions, and keeps an observable display model in step
//! with the wallet's account and network notifications.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod session;

pub use config::FundMeConfig;
pub use session::{SessionController, SessionSettings};
