//! Session record and its atomic transitions.

use std::sync::Arc;

use alloy::primitives::Address;
use arc_swap::ArcSwap;

use crate::observability::metrics;

/// Handles bound together for a connected account.
pub struct Binding<S, C> {
    pub account: Address,
    pub signer: S,
    pub contract: Arc<C>,
}

/// Connection state. Signer and contract exist only inside `Connected`,
/// so they are present exactly when an account is.
pub enum SessionState<S, C> {
    Disconnected,
    Connecting,
    Connected(Binding<S, C>),
}

impl<S, C> SessionState<S, C> {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected(_) => "connected",
        }
    }

    pub fn binding(&self) -> Option<&Binding<S, C>> {
        match self {
            SessionState::Connected(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.binding().map(|b| b.account)
    }

    pub fn signer(&self) -> Option<&S> {
        self.binding().map(|b| &b.signer)
    }

    pub fn contract(&self) -> Option<&Arc<C>> {
        self.binding().map(|b| &b.contract)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected(_))
    }
}

impl<S, C> std::fmt::Debug for SessionState<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.account() {
            Some(account) => write!(f, "Connected({})", account),
            None => f.write_str(self.name()),
        }
    }
}

/// The single mutable session record.
///
/// Readers take an `Arc` snapshot and keep working against it while a
/// transition swaps in the next state.
pub struct Session<S, C> {
    current: ArcSwap<SessionState<S, C>>,
}

impl<S, C> Session<S, C> {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(SessionState::Disconnected),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Arc<SessionState<S, C>> {
        self.current.load_full()
    }

    /// Replace the state, returning the one it replaced.
    pub fn transition(&self, next: SessionState<S, C>) -> Arc<SessionState<S, C>> {
        self.restore(Arc::new(next))
    }

    /// Put back a previously taken snapshot.
    pub fn restore(&self, state: Arc<SessionState<S, C>>) -> Arc<SessionState<S, C>> {
        let to = state.name();
        let account = state.account();
        let previous = self.current.swap(state);
        if previous.name() != to || previous.account() != account {
            tracing::debug!(from = previous.name(), to, ?account, "Session transition");
            metrics::record_transition(to);
        }
        previous
    }
}

impl<S, C> Default for Session<S, C> {
    fn default() -> Self {
        Self::new()
    }
}
