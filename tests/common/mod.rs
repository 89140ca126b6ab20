//! Scripted wallet and contract fakes for session tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use tokio::sync::{broadcast, Notify};

use fundme_client::blockchain::{
    AccountSigner, ContractProxy, PendingTx, ProviderError, ProviderEvent, ProviderResult,
    WalletProvider,
};
use fundme_client::{SessionController, SessionSettings};

pub const CONTRACT: Address = Address::repeat_byte(0xC0);
pub const OWNER: Address = Address::repeat_byte(0xAA);
pub const FUNDER: Address = Address::repeat_byte(0xBB);

/// `milli` thousandths of an ether, in wei.
pub fn eth(milli: u64) -> U256 {
    U256::from(milli) * U256::from(1_000_000_000_000_000u64)
}

/// What the fake chain holds and which calls should fail.
#[derive(Default)]
pub struct Script {
    pub owner: Address,
    pub funded: HashMap<Address, U256>,
    pub contract_balance: U256,
    pub minimum_usd: U256,
    pub request_error: Option<ProviderError>,
    pub owner_error: Option<ProviderError>,
    pub contribution_error: Option<ProviderError>,
    pub balance_error: Option<ProviderError>,
    pub fund_error: Option<ProviderError>,
    pub withdraw_error: Option<ProviderError>,
    pub wait_error: Option<ProviderError>,
}

/// Counts of calls that reached the fake chain.
#[derive(Default)]
pub struct Calls {
    pub binds: AtomicUsize,
    pub balance: AtomicUsize,
    pub owner: AtomicUsize,
    pub contribution: AtomicUsize,
    pub minimum: AtomicUsize,
    pub fund: AtomicUsize,
    pub withdraw: AtomicUsize,
    pub wait: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct Ledger {
    pub script: Mutex<Script>,
    pub calls: Calls,
}

impl Ledger {
    pub fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSigner(pub Address);

impl AccountSigner for MockSigner {
    fn address(&self) -> Address {
        self.0
    }
}

pub struct MockContract {
    caller: Address,
    ledger: Arc<Ledger>,
}

enum Effect {
    Fund(Address, U256),
    Withdraw,
}

pub struct MockPending {
    hash: TxHash,
    effect: Effect,
    ledger: Arc<Ledger>,
}

impl PendingTx for MockPending {
    fn tx_hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(self, _confirmations: u64) -> ProviderResult<TxHash> {
        bump(&self.ledger.calls.wait);
        let mut script = self.ledger.script();
        if let Some(err) = script.wait_error.clone() {
            return Err(err);
        }
        match self.effect {
            Effect::Fund(funder, value) => {
                *script.funded.entry(funder).or_default() += value;
                script.contract_balance += value;
            }
            Effect::Withdraw => {
                script.funded.clear();
                script.contract_balance = U256::ZERO;
            }
        }
        Ok(self.hash)
    }
}

impl ContractProxy for MockContract {
    type Pending = MockPending;

    fn address(&self) -> Address {
        CONTRACT
    }

    async fn get_owner(&self) -> ProviderResult<Address> {
        bump(&self.ledger.calls.owner);
        let script = self.ledger.script();
        match &script.owner_error {
            Some(err) => Err(err.clone()),
            None => Ok(script.owner),
        }
    }

    async fn get_address_to_amount_funded(&self, funder: Address) -> ProviderResult<U256> {
        bump(&self.ledger.calls.contribution);
        let script = self.ledger.script();
        match &script.contribution_error {
            Some(err) => Err(err.clone()),
            None => Ok(script.funded.get(&funder).copied().unwrap_or_default()),
        }
    }

    async fn minimum_usd(&self) -> ProviderResult<U256> {
        bump(&self.ledger.calls.minimum);
        Ok(self.ledger.script().minimum_usd)
    }

    async fn fund(&self, value: U256) -> ProviderResult<MockPending> {
        bump(&self.ledger.calls.fund);
        if let Some(err) = self.ledger.script().fund_error.clone() {
            return Err(err);
        }
        Ok(MockPending {
            hash: TxHash::repeat_byte(0x01),
            effect: Effect::Fund(self.caller, value),
            ledger: Arc::clone(&self.ledger),
        })
    }

    async fn cheaper_withdraw(&self) -> ProviderResult<MockPending> {
        bump(&self.ledger.calls.withdraw);
        if let Some(err) = self.ledger.script().withdraw_error.clone() {
            return Err(err);
        }
        Ok(MockPending {
            hash: TxHash::repeat_byte(0x02),
            effect: Effect::Withdraw,
            ledger: Arc::clone(&self.ledger),
        })
    }
}

pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    authorized: AtomicBool,
    request_gate: Mutex<Option<Arc<Notify>>>,
    events: broadcast::Sender<ProviderEvent>,
    pub ledger: Arc<Ledger>,
}

impl MockWallet {
    /// Wallet holding `accounts` (first is active) over a contract owned by `owner`.
    pub fn new(accounts: Vec<Address>, owner: Address) -> Self {
        let ledger = Ledger::default();
        ledger.script().owner = owner;
        let (events, _) = broadcast::channel(8);
        Self {
            accounts: Mutex::new(accounts),
            authorized: AtomicBool::new(false),
            request_gate: Mutex::new(None),
            events,
            ledger: Arc::new(ledger),
        }
    }

    /// As if the user approved this client on an earlier visit.
    pub fn authorize(self) -> Self {
        self.authorized.store(true, Ordering::SeqCst);
        self
    }

    /// Park `request_accounts` until `gate` is notified, like a pending approval prompt.
    pub fn hold_requests(&self, gate: Arc<Notify>) {
        *self.request_gate.lock().unwrap() = Some(gate);
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }
}

impl WalletProvider for MockWallet {
    type Signer = MockSigner;
    type Contract = MockContract;

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        let gate = self.request_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.ledger.script().request_error.clone() {
            return Err(err);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.accounts.lock().unwrap().clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    async fn signer(&self, account: Address) -> ProviderResult<MockSigner> {
        Ok(MockSigner(account))
    }

    fn bind_contract(&self, signer: &MockSigner, _address: Address) -> ProviderResult<MockContract> {
        bump(&self.ledger.calls.binds);
        Ok(MockContract {
            caller: signer.0,
            ledger: Arc::clone(&self.ledger),
        })
    }

    async fn balance(&self, _address: Address) -> ProviderResult<U256> {
        bump(&self.ledger.calls.balance);
        let script = self.ledger.script();
        match &script.balance_error {
            Some(err) => Err(err.clone()),
            None => Ok(script.contract_balance),
        }
    }
}

pub fn settings() -> SessionSettings {
    let mut settings = SessionSettings::new(CONTRACT);
    settings.notification_ttl = Duration::from_secs(60);
    settings
}

/// Controller over a wallet whose active account is `account`.
pub fn controller_for(account: Address, owner: Address) -> (SessionController<MockWallet>, Arc<Ledger>) {
    let wallet = MockWallet::new(vec![account], owner);
    let ledger = Arc::clone(&wallet.ledger);
    (SessionController::new(Some(wallet), settings()), ledger)
}

/// Same, already connected.
pub async fn connected(account: Address, owner: Address) -> (SessionController<MockWallet>, Arc<Ledger>) {
    let (controller, ledger) = controller_for(account, owner);
    controller.connect().await.expect("connect");
    (controller, ledger)
}

/// Message of the notification currently shown.
pub fn shown(controller: &SessionController<MockWallet>) -> Option<String> {
    controller.display().notification.map(|n| n.message)
}
