//! Configuration types for the lending cycle.

use std::collections::HashSet;

use alloy::primitives::{address, Address, U256};
use clients_lendpool::{EncodingError, LendPoolClientConfig, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use utils::MICROS_PER_UNIT;

const TESTNET_RPC_URL: &str = "https://testnet.dplabs-internal.com";
const ROUTER_ADDRESS: Address = address!("0xad3b4e20412a097f87cd8e8d84fbbe17ac7c89e9");
const MINT_ROUTER_ADDRESS: Address = address!("0x2e9d89d372837f71cb529e5ba85bfbc1785c69cd");
/// 5 gwei
const GAS_PRICE_WEI: u128 = 5_000_000_000;
const MINT_AMOUNT: &str = "100";
/// borrow(address,uint256,uint256,uint16,address)
const BORROW_SELECTOR: &str = "a415bcad";
/// repay(address,uint256,uint256,address)
const REPAY_SELECTOR: &str = "26a4e8d2";
const INTEREST_RATE_MODE: u64 = 2;

/// Largest decimals value for which 10^decimals still fits in a U256.
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rpc url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Selector(#[from] EncodingError),

    #[error("duplicate token symbol {0}")]
    DuplicateSymbol(String),

    #[error("{symbol}: decimals {decimals} exceed 77")]
    DecimalsOutOfRange { symbol: String, decimals: u8 },

    #[error("{symbol}: invalid {field} amount {value:?}")]
    InvalidAmount {
        symbol: String,
        field: &'static str,
        value: String,
    },

    #[error("supply range {min}..{max} is empty or too large")]
    InvalidSupplyRange { min: u64, max: u64 },

    #[error("no tokens configured")]
    NoTokens,
}

/// One token the cycle operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Unique symbol, used as the key for per-wallet bookkeeping
    pub symbol: String,
    /// ERC-20 contract address
    pub address: Address,
    pub decimals: u8,
    /// Whole-token amount minted per wallet, as a decimal string
    pub mint_amount: String,
    /// Whole-token amount borrowed per wallet, as a decimal string
    pub borrow_amount: String,
    /// Whole-token amount repaid per wallet, as a decimal string
    pub repay_amount: String,
}

impl TokenConfig {
    fn new(symbol: &str, address: Address, decimals: u8, mint: &str, borrow: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            address,
            decimals,
            mint_amount: mint.to_string(),
            borrow_amount: borrow.to_string(),
            repay_amount: borrow.to_string(),
        }
    }
}

/// Immutable configuration for one run, built once at startup and passed to the runner.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// JSON-RPC endpoint of the testnet
    pub rpc_url: Url,
    /// Lending pool router (supply, withdraw, borrow, repay and approval spender)
    pub router: Address,
    /// Helper contract minting test tokens
    pub mint_router: Address,
    /// Fixed legacy gas price in wei for every transaction
    pub gas_price: u128,
    /// Lower bound (inclusive) of the random supply amount, in whole tokens
    pub supply_min: u64,
    /// Upper bound (exclusive) of the random supply amount, in whole tokens
    pub supply_max: u64,
    pub borrow_selector: Selector,
    pub repay_selector: Selector,
    /// Interest-rate mode passed to borrow and repay (2 = variable)
    pub interest_rate_mode: U256,
    /// Referral code passed to supply
    pub referral_code: u16,
    /// Tokens in processing order
    pub tokens: Vec<TokenConfig>,
}

impl CycleConfig {
    /// The built-in testnet deployment.
    pub fn testnet() -> Result<Self, ConfigError> {
        let tokens = vec![
            TokenConfig::new(
                "USDC",
                address!("0x48249feEb47a8453023f702f15CF00206eeBdF08"),
                6,
                MINT_AMOUNT,
                "0.1",
            ),
            TokenConfig::new(
                "USDT",
                address!("0x0B00Fb1F513E02399667FBA50772B21f34c1b5D9"),
                6,
                MINT_AMOUNT,
                "0.1",
            ),
            TokenConfig::new(
                "BTC",
                address!("0xA4a967FC7cF0E9815bF5c2700A055813628b65BE"),
                8,
                MINT_AMOUNT,
                "0.00001",
            ),
            TokenConfig::new(
                "GOLD",
                address!("0x77f532df5f46DdFf1c97CDae3115271A523fa0f4"),
                18,
                MINT_AMOUNT,
                "0.0002",
            ),
            TokenConfig::new(
                "TSLA",
                address!("0xCDA3DF4AAB8a571688fE493EB1BdC1Ad210C09E4"),
                18,
                MINT_AMOUNT,
                "0.00005",
            ),
            TokenConfig::new(
                "NVIDIA",
                address!("0x3299cc551B2a39926Bf14144e65630e533dF6944"),
                18,
                MINT_AMOUNT,
                "0.00003",
            ),
        ];

        Ok(Self {
            rpc_url: TESTNET_RPC_URL.parse()?,
            router: ROUTER_ADDRESS,
            mint_router: MINT_ROUTER_ADDRESS,
            gas_price: GAS_PRICE_WEI,
            supply_min: 50,
            supply_max: 80,
            borrow_selector: Selector::from_hex(BORROW_SELECTOR)?,
            repay_selector: Selector::from_hex(REPAY_SELECTOR)?,
            interest_rate_mode: U256::from(INTEREST_RATE_MODE),
            referral_code: 0,
            tokens,
        })
    }

    /// Replaces the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: &str) -> Result<Self, ConfigError> {
        self.rpc_url = rpc_url.trim().parse()?;
        Ok(self)
    }

    /// Client-level settings derived from this configuration.
    pub fn lend_pool_config(&self) -> LendPoolClientConfig {
        LendPoolClientConfig {
            router: self.router,
            mint_router: self.mint_router,
            gas_price: self.gas_price,
        }
    }

    /// Checks the token table and supply range before any transaction is sent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.is_empty() {
            return Err(ConfigError::NoTokens);
        }
        if self.supply_min >= self.supply_max || self.supply_max > u64::MAX / MICROS_PER_UNIT {
            return Err(ConfigError::InvalidSupplyRange {
                min: self.supply_min,
                max: self.supply_max,
            });
        }

        let mut seen = HashSet::new();
        for token in &self.tokens {
            if !seen.insert(token.symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(token.symbol.clone()));
            }
            if token.decimals > MAX_DECIMALS {
                return Err(ConfigError::DecimalsOutOfRange {
                    symbol: token.symbol.clone(),
                    decimals: token.decimals,
                });
            }
            for (field, value) in [
                ("mint", &token.mint_amount),
                ("borrow", &token.borrow_amount),
                ("repay", &token.repay_amount),
            ] {
                if utils::to_smallest_unit(value, token.decimals).is_err() {
                    return Err(ConfigError::InvalidAmount {
                        symbol: token.symbol.clone(),
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testnet_table_is_valid() {
        let config = CycleConfig::testnet().unwrap();
        config.validate().unwrap();

        let symbols: Vec<_> = config.tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["USDC", "USDT", "BTC", "GOLD", "TSLA", "NVIDIA"]);
        assert_eq!(config.interest_rate_mode, U256::from(2u64));
        assert_eq!(config.gas_price, 5_000_000_000);
        assert!(config.tokens.iter().all(|t| t.borrow_amount == t.repay_amount));
    }

    #[test]
    fn rpc_override() {
        let config = CycleConfig::testnet()
            .unwrap()
            .with_rpc_url("http://localhost:8545")
            .unwrap();
        assert_eq!(config.rpc_url.as_str(), "http://localhost:8545/");
        assert!(CycleConfig::testnet().unwrap().with_rpc_url("not a url").is_err());
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let mut config = CycleConfig::testnet().unwrap();
        let first = config.tokens[0].clone();
        config.tokens.push(first);
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateSymbol(s)) if s == "USDC"));
    }

    #[test]
    fn rejects_bad_amounts_and_ranges() {
        let mut config = CycleConfig::testnet().unwrap();
        config.tokens[2].borrow_amount = "lots".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAmount { field: "borrow", .. })
        ));

        let mut config = CycleConfig::testnet().unwrap();
        config.tokens[0].decimals = 78;
        assert!(matches!(config.validate(), Err(ConfigError::DecimalsOutOfRange { .. })));

        let mut config = CycleConfig::testnet().unwrap();
        config.supply_max = config.supply_min;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSupplyRange { .. })));

        let mut config = CycleConfig::testnet().unwrap();
        config.tokens.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoTokens)));
    }

    #[test]
    fn token_config_deserializes() {
        let json = r#"{
            "symbol": "USDC",
            "address": "0x48249feEb47a8453023f702f15CF00206eeBdF08",
            "decimals": 6,
            "mint_amount": "100",
            "borrow_amount": "0.1",
            "repay_amount": "0.1"
        }"#;
        let token: TokenConfig = serde_json::from_str(json).unwrap();
        assert_eq!(token, CycleConfig::testnet().unwrap().tokens[0]);
    }
}
