//! Local-key wallet provider.
//!
//! Stands in for a browser wallet extension: holds one or more private keys,
//! tracks which account is selected and whether the user has authorized the
//! client, and fires the same account/chain notifications a wallet would.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use tokio::sync::broadcast;
use url::Url;

use crate::blockchain::contract::{rpc_error, FundMeContract};
use crate::blockchain::provider::{AccountSigner, ProviderEvent, WalletProvider};
use crate::blockchain::types::{ChainId, ProviderError, ProviderResult, WalletError};

/// Environment variable holding comma-separated private keys.
pub const PRIVATE_KEYS_ENV_VAR: &str = "FUNDME_PRIVATE_KEYS";

const EVENT_CAPACITY: usize = 16;

impl AccountSigner for PrivateKeySigner {
    fn address(&self) -> Address {
        Signer::address(self)
    }
}

/// Wallet provider backed by in-memory private keys and a JSON-RPC endpoint.
pub struct LocalWalletProvider {
    signers: Vec<PrivateKeySigner>,
    selected: AtomicUsize,
    authorized: AtomicBool,
    rpc_url: Url,
    reader: DynProvider,
    events: broadcast::Sender<ProviderEvent>,
}

impl LocalWalletProvider {
    /// Build a provider from hex private keys (with or without `0x`).
    pub fn from_private_keys<I, S>(keys: I, rpc_url: &str) -> Result<Self, WalletError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let signers = keys
            .into_iter()
            .map(|key| {
                let key = key.as_ref().trim();
                let key_hex = key.strip_prefix("0x").unwrap_or(key);
                key_hex
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| WalletError::Key(format!("Invalid private key format: {}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if signers.is_empty() {
            return Err(WalletError::NoKeys("at least one private key is required".to_string()));
        }

        let rpc_url: Url = rpc_url.parse().map_err(|e: url::ParseError| WalletError::RpcUrl {
            url: rpc_url.to_string(),
            reason: e.to_string(),
        })?;

        let reader = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        tracing::info!(
            accounts = signers.len(),
            primary = %Signer::address(&signers[0]),
            rpc_url = %rpc_url,
            "Local wallet initialized"
        );

        Ok(Self {
            signers,
            selected: AtomicUsize::new(0),
            authorized: AtomicBool::new(false),
            rpc_url,
            reader,
            events,
        })
    }

    /// Load keys from `FUNDME_PRIVATE_KEYS`.
    pub fn from_env(rpc_url: &str) -> Result<Self, WalletError> {
        let raw = std::env::var(PRIVATE_KEYS_ENV_VAR).map_err(|_| {
            WalletError::NoKeys(format!("Environment variable {} not set", PRIVATE_KEYS_ENV_VAR))
        })?;

        Self::from_private_keys(raw.split(',').filter(|k| !k.trim().is_empty()), rpc_url)
    }

    /// Every address this wallet holds, in key order.
    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(Signer::address).collect()
    }

    /// Make the key at `index` the active account.
    ///
    /// Fires `AccountsChanged` when the client is authorized.
    pub fn select_account(&self, index: usize) -> Result<Address, WalletError> {
        let signer = self.signers.get(index).ok_or_else(|| {
            WalletError::Key(format!(
                "account index {} out of range (wallet holds {})",
                index,
                self.signers.len()
            ))
        })?;
        self.selected.store(index, Ordering::SeqCst);

        if self.authorized.load(Ordering::SeqCst) {
            self.emit(ProviderEvent::AccountsChanged(self.ordered_accounts()));
        }
        Ok(Signer::address(signer))
    }

    /// Revoke authorization, as if the user disconnected the site.
    pub fn disconnect(&self) {
        if self.authorized.swap(false, Ordering::SeqCst) {
            self.emit(ProviderEvent::AccountsChanged(Vec::new()));
        }
    }

    /// Report a network switch.
    pub fn announce_chain(&self, chain_id: ChainId) {
        self.emit(ProviderEvent::ChainChanged(chain_id));
    }

    /// Chain ID reported by the RPC endpoint.
    pub async fn chain_id(&self) -> ProviderResult<ChainId> {
        self.reader.get_chain_id().await.map(ChainId).map_err(rpc_error)
    }

    /// Check the endpoint serves the expected chain.
    pub async fn verify_chain_id(&self, expected: ChainId) -> ProviderResult<()> {
        let actual = self.chain_id().await?;
        if actual != expected {
            return Err(ProviderError::message(format!(
                "Chain ID mismatch: expected {}, got {}",
                expected, actual
            )));
        }
        Ok(())
    }

    /// Selected account first, then the rest in key order.
    fn ordered_accounts(&self) -> Vec<Address> {
        let selected = self.selected.load(Ordering::SeqCst);
        let mut accounts = Vec::with_capacity(self.signers.len());
        accounts.push(Signer::address(&self.signers[selected]));
        accounts.extend(
            self.signers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != selected)
                .map(|(_, s)| Signer::address(s)),
        );
        accounts
    }

    fn emit(&self, event: ProviderEvent) {
        tracing::debug!(?event, "Wallet event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl WalletProvider for LocalWalletProvider {
    type Signer = PrivateKeySigner;
    type Contract = FundMeContract;

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.ordered_accounts())
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.ordered_accounts())
        } else {
            Ok(Vec::new())
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    async fn signer(&self, account: Address) -> ProviderResult<PrivateKeySigner> {
        self.signers
            .iter()
            .find(|s| Signer::address(*s) == account)
            .cloned()
            .ok_or_else(|| ProviderError::message(format!("unknown account {}", account)))
    }

    fn bind_contract(
        &self,
        signer: &PrivateKeySigner,
        address: Address,
    ) -> ProviderResult<FundMeContract> {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(self.rpc_url.clone())
            .erased();
        Ok(FundMeContract::new(address, provider))
    }

    async fn balance(&self, address: Address) -> ProviderResult<U256> {
        self.reader.get_balance(address).await.map_err(rpc_error)
    }
}

impl std::fmt::Debug for LocalWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWalletProvider")
            .field("accounts", &self.signers.len())
            .field("selected", &self.selected.load(Ordering::SeqCst))
            .field("authorized", &self.authorized.load(Ordering::SeqCst))
            .field("rpc_url", &self.rpc_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil's first two accounts
    const KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const RPC: &str = "http://localhost:8545";

    fn wallet() -> LocalWalletProvider {
        LocalWalletProvider::from_private_keys([KEY_0, KEY_1], RPC).unwrap()
    }

    #[test]
    fn test_addresses_from_keys() {
        let addresses = wallet().addresses();
        assert_eq!(addresses.len(), 2);
        assert_eq!(
            addresses[0].to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(
            addresses[1].to_string().to_lowercase(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let result = LocalWalletProvider::from_private_keys(["invalid_key"], RPC);
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_empty_key_list() {
        let result = LocalWalletProvider::from_private_keys(Vec::<String>::new(), RPC);
        assert!(matches!(result, Err(WalletError::NoKeys(_))));
    }

    #[test]
    fn test_invalid_rpc_url() {
        let result = LocalWalletProvider::from_private_keys([KEY_0], "not a url");
        assert!(matches!(result, Err(WalletError::RpcUrl { .. })));
    }

    #[tokio::test]
    async fn test_accounts_empty_until_requested() {
        let wallet = wallet();
        assert!(wallet.accounts().await.unwrap().is_empty());

        let requested = wallet.request_accounts().await.unwrap();
        assert_eq!(requested, wallet.addresses());
        assert_eq!(wallet.accounts().await.unwrap(), requested);
    }

    #[tokio::test]
    async fn test_select_account_reorders_and_notifies() {
        let wallet = wallet();
        let mut events = wallet.subscribe();

        // Not authorized yet: no event.
        wallet.select_account(1).unwrap();
        assert!(events.try_recv().is_err());

        let accounts = wallet.request_accounts().await.unwrap();
        let addresses = wallet.addresses();
        assert_eq!(accounts, vec![addresses[1], addresses[0]]);

        wallet.select_account(0).unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            ProviderEvent::AccountsChanged(vec![addresses[0], addresses[1]])
        );

        assert!(wallet.select_account(5).is_err());
    }

    #[tokio::test]
    async fn test_disconnect_fires_once() {
        let wallet = wallet();
        let mut events = wallet.subscribe();
        wallet.request_accounts().await.unwrap();

        wallet.disconnect();
        wallet.disconnect();

        assert_eq!(events.recv().await.unwrap(), ProviderEvent::AccountsChanged(Vec::new()));
        assert!(events.try_recv().is_err());
        assert!(wallet.accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signer_lookup() {
        let wallet = wallet();
        let addresses = wallet.addresses();
        let signer = wallet.signer(addresses[1]).await.unwrap();
        assert_eq!(AccountSigner::address(&signer), addresses[1]);
        assert!(wallet.signer(Address::ZERO).await.is_err());
    }

    #[test]
    fn test_announce_chain() {
        let wallet = wallet();
        let mut events = wallet.subscribe();
        wallet.announce_chain(ChainId(11155111));
        assert_eq!(
            events.try_recv().unwrap(),
            ProviderEvent::ChainChanged(ChainId(11155111))
        );
    }
}
