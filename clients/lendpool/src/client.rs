//! Alloy-backed lending pool client for a single signing wallet.

use std::sync::Arc;

use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{
    DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::debug;

use crate::calldata::RawCallPayload;
use crate::chain::{ChainError, LendingChain};
use crate::config::LendPoolClientConfig;
use crate::contracts::{ILendingPool, IMintRouter, IERC20};

/// LendPoolClient signs and submits lending pool transactions for one wallet
pub struct LendPoolClient {
    /// Signing provider layered over the shared connection
    provider: Arc<DynProvider>,
    /// Address of the signing wallet
    account: Address,
    /// Mint router contract instance
    mint_router: IMintRouter::IMintRouterInstance<Arc<DynProvider>>,
    /// Lending pool router contract instance
    pool: ILendingPool::ILendingPoolInstance<Arc<DynProvider>>,
    /// Fixed gas price attached to every transaction
    gas_price: u128,
}

impl LendPoolClient {
    /// Creates a new `LendPoolClient` instance
    ///
    /// # Arguments
    /// * `config` - Router addresses and gas price
    /// * `connection` - The shared, unsigned HTTP provider; cloning it reuses the same transport
    /// * `signer` - The wallet's private key signer
    ///
    /// # Returns
    /// A client whose transactions are signed by `signer` and sent through `connection`
    pub fn new(
        config: &LendPoolClientConfig,
        connection: RootProvider<Ethereum>,
        signer: PrivateKeySigner,
    ) -> Self {
        let account = signer.address();
        let provider = Arc::new(
            ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_provider(connection)
                .erased(),
        );
        Self {
            mint_router: IMintRouter::new(config.mint_router, Arc::clone(&provider)),
            pool: ILendingPool::new(config.router, Arc::clone(&provider)),
            provider,
            account,
            gas_price: config.gas_price,
        }
    }

    fn token(&self, token: Address) -> IERC20::IERC20Instance<Arc<DynProvider>> {
        IERC20::new(token, Arc::clone(&self.provider))
    }
}

#[async_trait]
impl LendingChain for LendPoolClient {
    fn account(&self) -> Address {
        self.account
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        self.token(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(ChainError::rpc)
    }

    async fn mint(
        &self,
        asset: Address,
        account: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .mint_router
            .mint(asset, account, amount)
            .gas_price(self.gas_price)
            .send()
            .await
            .map_err(ChainError::rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .token(token)
            .approve(spender, amount)
            .gas_price(self.gas_price)
            .send()
            .await
            .map_err(ChainError::rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn supply(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .pool
            .supply(asset, amount, on_behalf_of, referral_code)
            .gas_price(self.gas_price)
            .send()
            .await
            .map_err(ChainError::rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn withdraw(
        &self,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .pool
            .withdraw(asset, amount, to)
            .gas_price(self.gas_price)
            .send()
            .await
            .map_err(ChainError::rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn send_raw(&self, payload: &RawCallPayload) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default()
            .with_to(payload.to)
            .with_input(payload.calldata.clone())
            .with_gas_price(self.gas_price);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(ChainError::rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(ChainError::rpc)?;
        debug!(
            tx = %tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "receipt received"
        );
        if !receipt.status() {
            return Err(ChainError::Reverted(tx_hash));
        }
        Ok(())
    }
}
