//! Lending testnet cycle.
//!
//! Runs mint, approve, supply, withdraw, borrow and repay for every
//! configured token, across a list of wallets, one transaction at a time.

pub mod config;
mod runner;
mod types;
pub mod wallets;

pub use config::{ConfigError, CycleConfig, TokenConfig};
pub use runner::{withdraw_amount, CycleRunner};
pub use types::{Phase, RunReport, StepOutcome, StepReport, WalletReport};
pub use wallets::{load_private_keys, parse_private_keys, CredentialError, WalletContext};
