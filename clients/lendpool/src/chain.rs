//! The chain-client seam used by the wallet workflow.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::calldata::RawCallPayload;

/// Failure of a single chain interaction.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport, node or contract error; carries the provider's message or revert reason.
    #[error("{0}")]
    Rpc(String),

    /// The transaction was mined with a failed status.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
}

impl ChainError {
    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc(err.to_string())
    }
}

/// Operations the lending workflow needs from a signing chain client.
///
/// Submission methods return as soon as the node accepts the transaction;
/// [`LendingChain::wait_for_confirmation`] blocks until it is mined.
#[async_trait]
pub trait LendingChain: Send + Sync {
    /// Address of the signing account.
    fn account(&self) -> Address;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError>;

    async fn mint(
        &self,
        asset: Address,
        account: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError>;

    async fn supply(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Result<TxHash, ChainError>;

    async fn withdraw(
        &self,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> Result<TxHash, ChainError>;

    /// Sends a pre-encoded payload as a plain transaction.
    async fn send_raw(&self, payload: &RawCallPayload) -> Result<TxHash, ChainError>;

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ChainError>;
}
