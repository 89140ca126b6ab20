//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Session controller and wallet produce:
//!     → logging.rs (structured log events, one span per user action)
//!     → metrics.rs (action outcome and session transition counters)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`, filter from config, `RUST_LOG` wins
//! - Every user action carries an action ID on its span
//! - Metrics are recorded through the `metrics` facade; without an
//!   installed recorder they cost nothing

pub mod logging;
pub mod metrics;
