//! Chain-specific types and error definitions.

use std::fmt;

use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EIP-1193 code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Error object reported by a wallet provider or contract call.
///
/// Mirrors the loose shape wallets hand back: a revert reason can show up in
/// any of `message`, `reason` or `data`, so classification looks at all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Numeric provider code (4001 = user rejected).
    pub code: Option<i64>,
    /// Human readable message.
    pub message: String,
    /// Decoded revert reason or custom error name, when known.
    pub reason: Option<String>,
    /// Raw error data as text (usually hex revert data).
    pub data: Option<String>,
}

impl ProviderError {
    /// Error with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// The user declined the request in the wallet.
    pub fn user_rejected() -> Self {
        Self {
            code: Some(USER_REJECTED_CODE),
            message: "user rejected the request".to_string(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// True if the provider reported an explicit user decline.
    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }

    /// True if `needle` appears in the message, the reason or the data.
    pub fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle)
            || self.reason.as_deref().is_some_and(|r| r.contains(needle))
            || self.data.as_deref().is_some_and(|d| d.contains(needle))
    }
}

/// Result type for provider and contract calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised while setting up a local wallet provider.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Key(String),

    /// No keys were supplied.
    #[error("No wallet keys configured: {0}")]
    NoKeys(String),

    /// RPC endpoint could not be parsed.
    #[error("Invalid RPC URL '{url}': {reason}")]
    RpcUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(11155111u64);
        assert_eq!(chain_id.0, 11155111);
        assert_eq!(u64::from(chain_id), 11155111);
        assert_eq!(chain_id.to_string(), "11155111");
    }

    #[test]
    fn test_mentions_checks_every_field() {
        let err = ProviderError::message("call failed");
        assert!(!err.mentions("FundMe__NotOwner"));

        assert!(err.clone().with_reason("FundMe__NotOwner").mentions("NotOwner"));
        assert!(err.clone().with_data("FundMe__NotOwner()").mentions("FundMe__NotOwner"));
        assert!(ProviderError::message("reverted: FundMe__NotOwner").mentions("FundMe__NotOwner"));
    }

    #[test]
    fn test_user_rejection_code() {
        assert!(ProviderError::user_rejected().is_user_rejection());
        assert!(!ProviderError::message("nope").with_code(-32000).is_user_rejection());
    }

    #[test]
    fn test_error_display() {
        let err = WalletError::RpcUrl {
            url: "nope".into(),
            reason: "relative URL without a base".into(),
        };
        assert!(err.to_string().contains("nope"));
        assert_eq!(ProviderError::message("boom").to_string(), "boom");
    }
}
