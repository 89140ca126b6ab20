//! Session controller: connects the wallet, binds the contract, runs user
//! actions and reacts to wallet notifications.
//!
//! # Responsibilities
//! - Connect (prompting) and start-up check (non-prompting)
//! - Bind signer + contract atomically for the active account
//! - Fund / withdraw / query actions with per-action error reporting
//! - Account switch, disconnect and chain change handling

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{
    AccountSigner, ChainId, ContractProxy, PendingTx, ProviderError, ProviderEvent, WalletProvider,
};
use crate::config::{ConfigError, FundMeConfig};
use crate::observability::metrics;
use crate::session::amount::{parse_fund_amount, validate_amount, MINIMUM_FUND_ETH};
use crate::session::display::{
    format_address, format_decimal, format_eth, DisplayState, View, ERROR_TEXT,
};
use crate::session::errors::{
    classify_connect, classify_fund, classify_query, classify_withdraw, describe, Action,
    ActionError, ActionResult,
};
use crate::session::state::{Binding, Session, SessionState};

/// Decimals `MINIMUM_USD` is scaled by.
const USD_DECIMALS: u8 = 18;

/// Snapshot of the session for a given wallet provider.
pub type StateOf<W> =
    SessionState<<W as WalletProvider>::Signer, <W as WalletProvider>::Contract>;

/// Controller settings derived from config.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub contract_address: Address,
    pub confirmations: u64,
    pub minimum_eth: f64,
    pub notification_ttl: Duration,
}

impl SessionSettings {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            confirmations: 1,
            minimum_eth: MINIMUM_FUND_ETH,
            notification_ttl: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &FundMeConfig) -> Result<Self, ConfigError> {
        let contract_address = config.contract.address.parse::<Address>().map_err(|e| {
            ConfigError::invalid("contract.address", format!("not an address: {}", e))
        })?;
        Ok(Self {
            contract_address,
            confirmations: config.network.confirmations,
            minimum_eth: config.funding.minimum_eth,
            notification_ttl: Duration::from_millis(config.ui.notification_ttl_ms),
        })
    }
}

/// Owns the session record and the display model for one wallet provider.
pub struct SessionController<W: WalletProvider> {
    provider: Option<Arc<W>>,
    settings: SessionSettings,
    session: Session<W::Signer, W::Contract>,
    view: View,
}

impl<W: WalletProvider> SessionController<W> {
    /// `provider` is `None` when no wallet is available.
    pub fn new(provider: Option<W>, settings: SessionSettings) -> Self {
        let view = View::new(settings.notification_ttl);
        let contract_address = settings.contract_address.to_string();
        view.update(|s| s.contract_address = contract_address);
        Self {
            provider: provider.map(Arc::new),
            settings,
            session: Session::new(),
            view,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn provider(&self) -> Option<&Arc<W>> {
        self.provider.as_ref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn display(&self) -> DisplayState {
        self.view.snapshot()
    }

    pub fn state(&self) -> Arc<StateOf<W>> {
        self.session.snapshot()
    }

    /// Wallet notifications, if a wallet is present.
    pub fn subscribe_events(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        self.provider.as_ref().map(|p| p.subscribe())
    }

    /// Page-load check: bind silently if the wallet already authorized us.
    pub async fn check_connection(&self) {
        let Some(provider) = self.provider.clone() else {
            tracing::warn!("No wallet provider detected");
            self.view.update(|s| s.connection_status = "Wallet provider not detected".to_string());
            self.view.error("Please install a wallet provider to use this client");
            return;
        };

        match provider.accounts().await {
            Ok(accounts) => {
                if let Some(&account) = accounts.first() {
                    if let Err(e) = self.bind(&provider, account).await {
                        tracing::error!(error = %e, %account, "Error checking connection");
                    }
                } else {
                    tracing::debug!("Wallet has no authorized accounts yet");
                }
            }
            Err(e) => tracing::error!(error = %e, "Error checking connection"),
        }
    }

    /// Ask the wallet for accounts and bind the first one.
    pub async fn connect(&self) -> ActionResult<Address> {
        let result = self.connect_inner().instrument(action_span(Action::Connect)).await;
        self.finish(Action::Connect, result)
    }

    async fn connect_inner(&self) -> ActionResult<Address> {
        let provider = self.provider.clone().ok_or(ActionError::ProviderUnavailable)?;
        let _busy = self.view.busy(Action::Connect);

        let before = self.session.snapshot();
        if !before.is_connected() {
            self.session.transition(SessionState::Connecting);
        }

        let outcome = async {
            let accounts = provider
                .request_accounts()
                .await
                .map_err(|e| classify_connect(&e))?;
            let account = *accounts
                .first()
                .ok_or_else(|| ActionError::Generic("wallet returned no accounts".to_string()))?;
            self.bind(&provider, account)
                .await
                .map_err(|e| classify_connect(&e))?;
            Ok::<_, ActionError>(account)
        }
        .await;

        if outcome.is_err() && !self.session.snapshot().is_connected() {
            self.session.restore(before);
        }
        outcome
    }

    /// Bind signer and contract for `account`, then refresh everything.
    async fn bind(&self, provider: &W, account: Address) -> Result<(), ProviderError> {
        let signer = provider.signer(account).await?;
        let contract = provider.bind_contract(&signer, self.settings.contract_address)?;

        self.session.transition(SessionState::Connected(Binding {
            account,
            signer,
            contract: Arc::new(contract),
        }));
        self.view.update(|s| s.show_connected(account));
        tracing::info!(%account, contract = %self.settings.contract_address, "Wallet connected");

        self.refresh_all().await;

        self.view
            .success(format!("Successfully connected to {}", format_address(account)));
        Ok(())
    }

    /// Balance, contribution and owner status, concurrently and independently.
    pub async fn refresh_all(&self) {
        let (_balance, (), ()) = futures_util::join!(
            self.refresh_balance(),
            self.refresh_contribution(),
            self.refresh_owner_status(),
        );
    }

    /// Dispatch a wallet notification.
    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.handle_accounts_changed(accounts).await,
            ProviderEvent::ChainChanged(chain_id) => self.handle_chain_changed(chain_id).await,
        }
    }

    /// Empty list: disconnect. New primary account: re-bind.
    pub async fn handle_accounts_changed(&self, accounts: Vec<Address>) {
        let Some(&primary) = accounts.first() else {
            self.handle_disconnect();
            return;
        };

        if self.session.snapshot().account() == Some(primary) {
            return;
        }
        let Some(provider) = self.provider.clone() else {
            return;
        };

        tracing::info!(account = %primary, "Wallet switched accounts");
        if let Err(e) = self.bind(&provider, primary).await {
            tracing::error!(error = %e, account = %primary, "Failed to bind switched account");
            self.view.error("Failed to connect wallet");
        }
    }

    /// Clear the session and reset the display. Idempotent.
    pub fn handle_disconnect(&self) {
        if self.tear_down() {
            tracing::info!("Wallet disconnected");
            self.view.info("Wallet disconnected");
        }
    }

    /// Network switched: tear down and run the start-up sequence again.
    pub async fn handle_chain_changed(&self, chain_id: ChainId) {
        tracing::info!(%chain_id, "Wallet switched chains, restarting session");
        self.tear_down();
        self.view.update(|s| {
            s.amount_input.clear();
            s.amount_error = None;
        });
        self.check_connection().await;
    }

    /// Returns true if a connected session was torn down. An in-flight
    /// connect is not a session yet.
    fn tear_down(&self) -> bool {
        let previous = self.session.transition(SessionState::Disconnected);
        self.view.update(DisplayState::reset_connection);
        previous.is_connected()
    }

    /// Record amount input and update the inline error. Returns validity.
    pub fn set_amount_input(&self, input: &str) -> bool {
        let verdict = validate_amount(input, self.settings.minimum_eth);
        let error = verdict.as_ref().err().map(ToString::to_string);
        self.view.update(|s| {
            s.amount_input = input.to_string();
            s.amount_error = error;
        });
        verdict.is_ok()
    }

    /// Fund the contract with `amount` ETH.
    pub async fn fund(&self, amount: &str) -> ActionResult<TxHash> {
        let result = self.fund_inner(amount).instrument(action_span(Action::Fund)).await;
        self.finish(Action::Fund, result)
    }

    async fn fund_inner(&self, amount: &str) -> ActionResult<TxHash> {
        let state = self.session.snapshot();
        let binding = state.binding().ok_or(ActionError::NotConnected)?;

        self.set_amount_input(amount);
        let amount = amount.trim();
        let value = parse_fund_amount(amount, self.settings.minimum_eth)?;

        let _busy = self.view.busy(Action::Fund);
        self.view
            .info(format!("Initiating funding transaction for {} ETH...", amount));

        let pending = binding
            .contract
            .fund(value)
            .await
            .map_err(|e| classify_fund(&e))?;
        tracing::info!(tx_hash = %pending.tx_hash(), %value, "Funding transaction submitted");
        self.view.info("Transaction submitted! Waiting for confirmation...");

        let tx_hash = pending
            .wait(self.settings.confirmations)
            .await
            .map_err(|e| classify_fund(&e))?;
        self.view.success(format!("Successfully funded {} ETH!", amount));
        self.view.update(|s| {
            s.amount_input.clear();
            s.amount_error = None;
        });

        self.refresh_all().await;
        Ok(tx_hash)
    }

    /// Withdraw all funds; only the owner may.
    pub async fn withdraw(&self) -> ActionResult<TxHash> {
        let result = self.withdraw_inner().instrument(action_span(Action::Withdraw)).await;
        self.finish(Action::Withdraw, result)
    }

    async fn withdraw_inner(&self) -> ActionResult<TxHash> {
        let state = self.session.snapshot();
        let binding = state.binding().ok_or(ActionError::NotConnected)?;
        let busy = self.view.busy(Action::Withdraw);

        let owner = binding
            .contract
            .get_owner()
            .await
            .map_err(|e| classify_withdraw(&e))?;
        let caller = binding.signer.address();
        if owner != caller {
            tracing::warn!(%owner, %caller, "Withdraw refused before submission: not the owner");
            return Err(ActionError::Unauthorized);
        }

        busy.relabel("Withdrawing");
        self.view.info("Initiating withdrawal transaction...");

        let pending = binding
            .contract
            .cheaper_withdraw()
            .await
            .map_err(|e| classify_withdraw(&e))?;
        tracing::info!(tx_hash = %pending.tx_hash(), "Withdrawal transaction submitted");
        self.view.info("Transaction submitted! Waiting for confirmation...");

        let tx_hash = pending
            .wait(self.settings.confirmations)
            .await
            .map_err(|e| classify_withdraw(&e))?;
        self.view.success("Withdrawal successful!");

        self.refresh_all().await;
        Ok(tx_hash)
    }

    /// Native balance held by the contract.
    pub async fn refresh_balance(&self) -> ActionResult<U256> {
        let result = self
            .refresh_balance_inner()
            .instrument(action_span(Action::RefreshBalance))
            .await;
        if matches!(result, Err(ref e) if !matches!(e, ActionError::NotConnected)) {
            self.view.update(|s| s.contract_balance = ERROR_TEXT.to_string());
        }
        self.finish(Action::RefreshBalance, result)
    }

    async fn refresh_balance_inner(&self) -> ActionResult<U256> {
        let provider = self.provider.clone().ok_or(ActionError::NotConnected)?;
        if !self.session.snapshot().is_connected() {
            return Err(ActionError::NotConnected);
        }
        let _busy = self.view.busy(Action::RefreshBalance);

        let balance = provider
            .balance(self.settings.contract_address)
            .await
            .map_err(|e| classify_query(&e))?;
        self.view.update(|s| s.contract_balance = format_eth(balance));
        Ok(balance)
    }

    /// Amount the connected account has funded. Silent when disconnected.
    pub async fn refresh_contribution(&self) {
        let state = self.session.snapshot();
        let Some(binding) = state.binding() else {
            return;
        };

        match binding.contract.get_address_to_amount_funded(binding.account).await {
            Ok(amount) => self.view.update(|s| s.user_contribution = format_eth(amount)),
            Err(e) => {
                tracing::error!(error = %e, account = %binding.account, "User contribution fetch error");
                self.view.update(|s| s.user_contribution = ERROR_TEXT.to_string());
            }
        }
    }

    /// Whether the connected account owns the contract. Silent when disconnected.
    pub async fn refresh_owner_status(&self) {
        let state = self.session.snapshot();
        let Some(binding) = state.binding() else {
            return;
        };

        match binding.contract.get_owner().await {
            Ok(owner) => {
                let status = if owner == binding.account { "✅ Owner" } else { "❌ Not Owner" };
                self.view.update(|s| s.owner_status = status.to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "Owner status check error");
                self.view.update(|s| s.owner_status = ERROR_TEXT.to_string());
            }
        }
    }

    /// Look up and announce the contract owner.
    pub async fn get_owner(&self) -> ActionResult<Address> {
        let result = async {
            let state = self.session.snapshot();
            let binding = state.binding().ok_or(ActionError::NotConnected)?;
            let _busy = self.view.busy(Action::GetOwner);
            let owner = binding
                .contract
                .get_owner()
                .await
                .map_err(|e| classify_query(&e))?;
            self.view
                .info(format!("Contract Owner: {}", format_address(owner)));
            Ok::<_, ActionError>(owner)
        }
        .instrument(action_span(Action::GetOwner))
        .await;
        self.finish(Action::GetOwner, result)
    }

    /// Look up and announce `MINIMUM_USD`.
    pub async fn get_minimum_usd(&self) -> ActionResult<U256> {
        let result = async {
            let state = self.session.snapshot();
            let binding = state.binding().ok_or(ActionError::NotConnected)?;
            let _busy = self.view.busy(Action::GetMinimum);
            let minimum = binding
                .contract
                .minimum_usd()
                .await
                .map_err(|e| classify_query(&e))?;
            self.view.info(format!(
                "Minimum funding amount: ${} USD",
                format_decimal(minimum, USD_DECIMALS)
            ));
            Ok::<_, ActionError>(minimum)
        }
        .instrument(action_span(Action::GetMinimum))
        .await;
        self.finish(Action::GetMinimum, result)
    }

    /// Log, count and surface the outcome of an action.
    fn finish<T>(&self, action: Action, result: ActionResult<T>) -> ActionResult<T> {
        match &result {
            Ok(_) => metrics::record_action(action.as_str(), "ok"),
            Err(e) => {
                tracing::warn!(%action, error = %e, "Action failed");
                metrics::record_action(action.as_str(), outcome_label(e));
                self.view.error(describe(action, e));
            }
        }
        result
    }
}

impl<W: WalletProvider> std::fmt::Debug for SessionController<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("provider", &self.provider.is_some())
            .field("settings", &self.settings)
            .field("state", &*self.session.snapshot())
            .finish()
    }
}

fn action_span(action: Action) -> tracing::Span {
    tracing::info_span!("action", %action, action_id = %Uuid::new_v4())
}

fn outcome_label(err: &ActionError) -> &'static str {
    match err {
        ActionError::UserRejected => "user_rejected",
        ActionError::Unauthorized => "unauthorized",
        ActionError::InsufficientFunds => "insufficient_funds",
        ActionError::BelowMinimum => "below_minimum",
        ActionError::ProviderUnavailable => "provider_unavailable",
        ActionError::NotConnected => "not_connected",
        ActionError::InvalidAmount(_) => "invalid_amount",
        ActionError::Reverted(_) => "reverted",
        ActionError::Generic(_) => "error",
    }
}
