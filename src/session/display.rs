//! Observable display model and transient notifications.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::utils::{format_ether, format_units};
use alloy::primitives::{Address, U256};
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::session::errors::Action;

pub const PLACEHOLDER: &str = "-";
pub const ETH_PLACEHOLDER: &str = "- ETH";
pub const ERROR_TEXT: &str = "Error";

const NOTIFICATION_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Everything the page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    pub connection_status: String,
    pub account_label: String,
    pub contract_address: String,
    pub contract_balance: String,
    pub user_contribution: String,
    pub owner_status: String,
    pub connect_label: String,
    pub amount_input: String,
    pub amount_error: Option<String>,
    /// In-flight actions and their loading labels.
    pub busy: BTreeMap<Action, String>,
    pub notification: Option<Notification>,
}

impl DisplayState {
    /// Put every connection-derived field back to its placeholder.
    pub fn reset_connection(&mut self) {
        self.connection_status = "Not Connected".to_string();
        self.account_label = PLACEHOLDER.to_string();
        self.contract_balance = ETH_PLACEHOLDER.to_string();
        self.user_contribution = ETH_PLACEHOLDER.to_string();
        self.owner_status = PLACEHOLDER.to_string();
        self.connect_label = "Connect Wallet".to_string();
    }

    pub fn show_connected(&mut self, account: Address) {
        self.connection_status = "Connected".to_string();
        self.account_label = format_address(account);
        self.connect_label = "✅ Connected".to_string();
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.busy.contains_key(&action)
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        let mut state = Self {
            connection_status: String::new(),
            account_label: String::new(),
            contract_address: String::new(),
            contract_balance: String::new(),
            user_contribution: String::new(),
            owner_status: String::new(),
            connect_label: String::new(),
            amount_input: String::new(),
            amount_error: None,
            busy: BTreeMap::new(),
            notification: None,
        };
        state.reset_connection();
        state
    }
}

/// Publishes the display model and notifications to whoever renders them.
pub struct View {
    state: Arc<watch::Sender<DisplayState>>,
    notifications: broadcast::Sender<Notification>,
    ttl: Duration,
    next_id: AtomicU64,
}

impl View {
    /// `ttl` is how long a notification stays before auto-hiding.
    pub fn new(ttl: Duration) -> Self {
        let (state, _) = watch::channel(DisplayState::default());
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            state: Arc::new(state),
            notifications,
            ttl,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.subscribe()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn snapshot(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut DisplayState)) {
        self.state.send_modify(f);
    }

    /// Show a notification, replacing the current one.
    ///
    /// Hidden again after the TTL unless something newer replaced it. Needs a
    /// tokio runtime for the auto-hide; without one it stays until replaced.
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
        };
        let id = notification.id;
        tracing::debug!(id, ?kind, message = %notification.message, "Notification");

        self.state
            .send_modify(|s| s.notification = Some(notification.clone()));
        let _ = self.notifications.send(notification);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let state = Arc::clone(&self.state);
            let ttl = self.ttl;
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                state.send_if_modified(|s| {
                    if s.notification.as_ref().map(|n| n.id) == Some(id) {
                        s.notification = None;
                        true
                    } else {
                        false
                    }
                });
            });
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message);
    }

    /// Mark `action` busy until the returned guard drops.
    pub fn busy(&self, action: Action) -> BusyGuard<'_> {
        self.update(|s| {
            s.busy.insert(action, action.loading_label().to_string());
        });
        BusyGuard { view: self, action }
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View").field("ttl", &self.ttl).finish()
    }
}

/// Clears an action's loading state when dropped, success or failure.
pub struct BusyGuard<'a> {
    view: &'a View,
    action: Action,
}

impl BusyGuard<'_> {
    /// Change the loading label mid-action.
    pub fn relabel(&self, label: &str) {
        let action = self.action;
        self.view.update(|s| {
            s.busy.insert(action, label.to_string());
        });
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let action = self.action;
        self.view.update(|s| {
            s.busy.remove(&action);
        });
    }
}

/// `0x1234...abcd`.
pub fn format_address(address: Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Wei as ETH with four decimals, e.g. `0.0100 ETH`.
pub fn format_eth(wei: U256) -> String {
    let ether = format_ether(wei);
    match ether.parse::<f64>() {
        Ok(value) => format!("{:.4} ETH", value),
        Err(_) => format!("{} ETH", ether),
    }
}

/// Fixed-point value with trailing zeros trimmed, keeping one decimal.
pub fn format_decimal(value: U256, decimals: u8) -> String {
    let Ok(text) = format_units(value, decimals) else {
        return value.to_string();
    };
    match text.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => format!("{}.0", text),
    }
}
