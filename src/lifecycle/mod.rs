//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Load wallet → Build controller → Check connection
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop reading commands and wallet events → Exit
//!
//! Signals (signals.rs):
//!     SIGINT (ctrl-c) → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast on config errors; a missing wallet is not fatal
//! - Startup is sequential: config first, wallet, then controller

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
