//! Action taxonomy, error kinds, and provider error classification.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::blockchain::contract::NOT_OWNER_ERROR;
use crate::blockchain::ProviderError;
use crate::session::amount::AmountError;

/// Revert text `fund()` raises when the value is under `MINIMUM_USD`.
pub const BELOW_MINIMUM_REVERT: &str = "You need to spend more ETH";

const INSUFFICIENT_FUNDS: &str = "insufficient funds";
const EXECUTION_REVERTED: &str = "execution reverted";
const NOT_OWNER_SHORT: &str = "NotOwner";

/// User-triggerable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Connect,
    Fund,
    Withdraw,
    RefreshBalance,
    GetOwner,
    GetMinimum,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Fund => "fund",
            Action::Withdraw => "withdraw",
            Action::RefreshBalance => "refresh_balance",
            Action::GetOwner => "get_owner",
            Action::GetMinimum => "get_minimum",
        }
    }

    /// Label shown while the action is in flight.
    pub fn loading_label(&self) -> &'static str {
        match self {
            Action::Connect => "Connecting",
            Action::Fund => "Funding",
            Action::Withdraw => "Checking permissions",
            Action::RefreshBalance | Action::GetOwner | Action::GetMinimum => "Loading",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a user action failed. None of these end the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// The user declined in the wallet.
    #[error("Request rejected by user")]
    UserRejected,

    /// Connected account is not the contract owner.
    #[error("Only the contract owner can withdraw funds")]
    Unauthorized,

    /// Not enough native balance to cover value plus gas.
    #[error("Insufficient funds for transaction")]
    InsufficientFunds,

    /// The contract refused the amount as under its USD minimum.
    #[error("Amount below minimum funding requirement")]
    BelowMinimum,

    /// No wallet provider is available.
    #[error("Please install a wallet provider")]
    ProviderUnavailable,

    /// Action needs a connected session.
    #[error("Please connect your wallet first")]
    NotConnected,

    /// Amount input failed client-side validation.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// Reverted for a reason we cannot attribute.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Anything else, carrying the underlying message.
    #[error("{0}")]
    Generic(String),
}

/// Result type for user actions.
pub type ActionResult<T> = Result<T, ActionError>;

/// Classify a failed account request.
pub fn classify_connect(err: &ProviderError) -> ActionError {
    if err.is_user_rejection() {
        ActionError::UserRejected
    } else {
        ActionError::Generic(err.message.clone())
    }
}

/// Classify a failed `fund()` submission or confirmation.
pub fn classify_fund(err: &ProviderError) -> ActionError {
    if err.is_user_rejection() {
        ActionError::UserRejected
    } else if err.mentions(INSUFFICIENT_FUNDS) {
        ActionError::InsufficientFunds
    } else if err.mentions(BELOW_MINIMUM_REVERT) {
        ActionError::BelowMinimum
    } else {
        ActionError::Generic(err.message.clone())
    }
}

/// Classify a failed owner lookup, `cheaperWithdraw()` submission or confirmation.
pub fn classify_withdraw(err: &ProviderError) -> ActionError {
    if err.is_user_rejection() {
        ActionError::UserRejected
    } else if is_not_owner_revert(err) {
        ActionError::Unauthorized
    } else if err.mentions(INSUFFICIENT_FUNDS) {
        ActionError::InsufficientFunds
    } else if err.mentions(EXECUTION_REVERTED) {
        ActionError::Reverted(err.reason.clone().unwrap_or_else(|| err.message.clone()))
    } else {
        ActionError::Generic(err.message.clone())
    }
}

/// Classify a failed read-only query.
pub fn classify_query(err: &ProviderError) -> ActionError {
    if err.is_user_rejection() {
        ActionError::UserRejected
    } else {
        ActionError::Generic(err.message.clone())
    }
}

fn is_not_owner_revert(err: &ProviderError) -> bool {
    err.mentions(NOT_OWNER_ERROR)
        || (err.message.contains(EXECUTION_REVERTED) && err.message.contains(NOT_OWNER_SHORT))
}

/// Notification text for a failed action.
pub fn describe(action: Action, err: &ActionError) -> String {
    match (action, err) {
        (_, ActionError::NotConnected) | (_, ActionError::ProviderUnavailable) => err.to_string(),
        (Action::Connect, ActionError::UserRejected) => "Connection rejected by user".to_string(),
        (Action::Connect, _) => "Failed to connect wallet".to_string(),
        (_, ActionError::UserRejected) => "Transaction rejected by user".to_string(),
        (Action::Fund, ActionError::InvalidAmount(_)) => AmountError::Missing.to_string(),
        (Action::Fund, ActionError::InsufficientFunds) => "Insufficient ETH balance".to_string(),
        (Action::Fund, ActionError::Generic(msg)) => format!("Funding failed: {}", msg),
        (Action::Withdraw, ActionError::Unauthorized) => {
            "❌ Only the contract owner can withdraw funds".to_string()
        }
        (Action::Withdraw, ActionError::Reverted(_)) => {
            "Transaction reverted - you may not be the owner".to_string()
        }
        (Action::Withdraw, ActionError::Generic(msg)) => format!("Withdrawal failed: {}", msg),
        (Action::RefreshBalance, _) => "Failed to fetch contract balance".to_string(),
        (Action::GetOwner, _) => "Failed to fetch contract owner".to_string(),
        (Action::GetMinimum, _) => "Failed to fetch minimum USD amount".to_string(),
        _ => err.to_string(),
    }
}
