//! Configuration types for the lending pool client.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Configuration for LendPoolClient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendPoolClientConfig {
    /// The lending pool router that receives supply/withdraw/borrow/repay calls
    pub router: Address,
    /// The helper contract that mints testnet tokens
    pub mint_router: Address,
    /// Fixed legacy gas price in wei attached to every submitted transaction
    pub gas_price: u128,
}
