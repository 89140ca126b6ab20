//! Seams to the two external collaborators: the wallet provider and the
//! contract proxy it binds.
//!
//! The session controller only talks to these traits. `wallet.rs` and
//! `contract.rs` provide the alloy-backed implementations; tests plug in
//! scripted fakes.

use std::future::Future;

use alloy::primitives::{Address, TxHash, U256};
use tokio::sync::broadcast;

use crate::blockchain::types::{ChainId, ProviderResult};

/// Notification fired by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Authorized account list changed. Empty means the user disconnected;
    /// the first entry is the active account.
    AccountsChanged(Vec<Address>),
    /// The wallet switched networks.
    ChainChanged(ChainId),
}

/// A transaction signer bound to one account.
pub trait AccountSigner: Clone + Send + Sync + 'static {
    /// Address the signer sends from.
    fn address(&self) -> Address;
}

/// A submitted transaction awaiting inclusion.
pub trait PendingTx: Send {
    /// Hash of the submitted transaction.
    fn tx_hash(&self) -> TxHash;

    /// Resolve once the transaction has `confirmations` confirmations.
    ///
    /// No timeout is applied; the future stays pending until the provider
    /// resolves or rejects it.
    fn wait(self, confirmations: u64) -> impl Future<Output = ProviderResult<TxHash>> + Send;
}

/// Typed handle on the deployed FundMe contract.
pub trait ContractProxy: Send + Sync + 'static {
    type Pending: PendingTx;

    /// Deployed contract address.
    fn address(&self) -> Address;

    fn get_owner(&self) -> impl Future<Output = ProviderResult<Address>> + Send;

    fn get_address_to_amount_funded(
        &self,
        funder: Address,
    ) -> impl Future<Output = ProviderResult<U256>> + Send;

    /// `MINIMUM_USD`, scaled by 1e18.
    fn minimum_usd(&self) -> impl Future<Output = ProviderResult<U256>> + Send;

    /// Submit `fund()` carrying `value` wei.
    fn fund(&self, value: U256) -> impl Future<Output = ProviderResult<Self::Pending>> + Send;

    /// Submit `cheaperWithdraw()`.
    fn cheaper_withdraw(&self) -> impl Future<Output = ProviderResult<Self::Pending>> + Send;
}

/// External wallet holding the user's keys.
pub trait WalletProvider: Send + Sync + 'static {
    type Signer: AccountSigner;
    type Contract: ContractProxy;

    /// Ask the user to authorize accounts (prompting).
    fn request_accounts(&self) -> impl Future<Output = ProviderResult<Vec<Address>>> + Send;

    /// Accounts already authorized (non-prompting). Empty if none.
    fn accounts(&self) -> impl Future<Output = ProviderResult<Vec<Address>>> + Send;

    /// Subscribe to account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;

    /// Produce a signer bound to `account`.
    fn signer(&self, account: Address) -> impl Future<Output = ProviderResult<Self::Signer>> + Send;

    /// Bind the contract at `address` to `signer`.
    fn bind_contract(&self, signer: &Self::Signer, address: Address) -> ProviderResult<Self::Contract>;

    /// Native balance of `address` in wei.
    fn balance(&self, address: Address) -> impl Future<Output = ProviderResult<U256>> + Send;
}
