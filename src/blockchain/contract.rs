//! alloy binding for the FundMe contract.

use alloy::network::Ethereum;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder};
use alloy::sol;
use alloy::transports::{RpcError, TransportErrorKind};

use crate::blockchain::provider::{ContractProxy, PendingTx};
use crate::blockchain::types::{ProviderError, ProviderResult};

sol! {
    #[sol(rpc)]
    contract FundMe {
        /// Raised by `onlyOwner` functions.
        error FundMe__NotOwner();

        function fund() public payable;
        function cheaperWithdraw() public;
        function getOwner() external view returns (address);
        function getAddressToAmountFunded(address fundingAddress) external view returns (uint256);
        function MINIMUM_USD() external view returns (uint256);
    }
}

/// Name used as the revert reason when `FundMe__NotOwner` is decoded.
pub const NOT_OWNER_ERROR: &str = "FundMe__NotOwner";

/// FundMe contract bound to a signing provider.
#[derive(Clone)]
pub struct FundMeContract {
    inner: FundMe::FundMeInstance<DynProvider>,
}

impl FundMeContract {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self {
            inner: FundMe::new(address, provider),
        }
    }
}

impl std::fmt::Debug for FundMeContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundMeContract")
            .field("address", self.inner.address())
            .finish()
    }
}

impl ContractProxy for FundMeContract {
    type Pending = FundMePending;

    fn address(&self) -> Address {
        *self.inner.address()
    }

    async fn get_owner(&self) -> ProviderResult<Address> {
        self.inner.getOwner().call().await.map_err(contract_error)
    }

    async fn get_address_to_amount_funded(&self, funder: Address) -> ProviderResult<U256> {
        self.inner
            .getAddressToAmountFunded(funder)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn minimum_usd(&self) -> ProviderResult<U256> {
        self.inner.MINIMUM_USD().call().await.map_err(contract_error)
    }

    async fn fund(&self, value: U256) -> ProviderResult<FundMePending> {
        let pending = self
            .inner
            .fund()
            .value(value)
            .send()
            .await
            .map_err(contract_error)?;
        tracing::debug!(tx_hash = %pending.tx_hash(), %value, "fund() submitted");
        Ok(FundMePending { inner: pending })
    }

    async fn cheaper_withdraw(&self) -> ProviderResult<FundMePending> {
        let pending = self
            .inner
            .cheaperWithdraw()
            .send()
            .await
            .map_err(contract_error)?;
        tracing::debug!(tx_hash = %pending.tx_hash(), "cheaperWithdraw() submitted");
        Ok(FundMePending { inner: pending })
    }
}

/// Submitted FundMe transaction.
pub struct FundMePending {
    inner: PendingTransactionBuilder<Ethereum>,
}

impl PendingTx for FundMePending {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn wait(self, confirmations: u64) -> ProviderResult<TxHash> {
        let tx_hash = *self.inner.tx_hash();
        let receipt = self
            .inner
            .with_required_confirmations(confirmations)
            .get_receipt()
            .await
            .map_err(|e| ProviderError::message(e.to_string()))?;

        if !receipt.status() {
            return Err(ProviderError::message(format!(
                "execution reverted: transaction {tx_hash} failed on-chain"
            )));
        }

        tracing::debug!(
            %tx_hash,
            block_number = receipt.block_number.unwrap_or_default(),
            confirmations,
            "Transaction confirmed"
        );
        Ok(tx_hash)
    }
}

/// Flatten an alloy contract error into the provider error object.
///
/// A decodable `FundMe__NotOwner` revert fills `reason`; JSON-RPC error
/// responses carry their code and raw data across.
fn contract_error(err: alloy::contract::Error) -> ProviderError {
    let mut out = ProviderError::message(err.to_string());

    if err.as_decoded_error::<FundMe::FundMe__NotOwner>().is_some() {
        out.reason = Some(NOT_OWNER_ERROR.to_string());
    }

    if let alloy::contract::Error::TransportError(rpc) = &err {
        fill_from_rpc(&mut out, rpc);
    }

    out
}

/// Copy code and data from a JSON-RPC error response.
pub(crate) fn fill_from_rpc(out: &mut ProviderError, err: &RpcError<TransportErrorKind>) {
    if let RpcError::ErrorResp(payload) = err {
        out.code = Some(payload.code);
        if let Some(data) = &payload.data {
            out.data = Some(data.get().to_string());
        }
    }
}

/// Convert a bare RPC error (provider calls outside the contract binding).
pub(crate) fn rpc_error(err: RpcError<TransportErrorKind>) -> ProviderError {
    let mut out = ProviderError::message(err.to_string());
    fill_from_rpc(&mut out, &err);
    out
}
