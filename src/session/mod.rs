//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! user action / wallet notification
//!     → controller.rs (precondition, busy label, provider/contract calls)
//!     → errors.rs (classify provider errors into ActionError)
//!     → state.rs (atomic session transitions)
//!     → display.rs (display model + transient notifications)
//! ```
//!
//! # Design Decisions
//! - One controller instance owns the session; no globals
//! - Signer and contract only exist inside the `Connected` state
//! - Every failure is caught at the action boundary and shown as a
//!   notification; the controller stays usable afterwards

pub mod amount;
pub mod controller;
pub mod display;
pub mod errors;
pub mod state;

pub use amount::{validate_amount, AmountError, MINIMUM_FUND_ETH};
pub use controller::{SessionController, SessionSettings};
pub use display::{DisplayState, Notification, NotificationKind, View};
pub use errors::{Action, ActionError, ActionResult};
pub use state::{Binding, Session, SessionState};
