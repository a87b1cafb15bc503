mod calldata;
mod chain;
mod client;
mod config;
mod contracts;

pub use calldata::{
    encode, encode_hex, pad32_address, pad32_uint, EncodingError, RawCallPayload, Selector,
};
pub use chain::{ChainError, LendingChain};
pub use client::LendPoolClient;
pub use config::LendPoolClientConfig;
pub use contracts::{ILendingPool, IMintRouter, IERC20};
