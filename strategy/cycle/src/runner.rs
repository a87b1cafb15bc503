//! Wallet workflow runner
//!
//! Drives every wallet through mint, approve, supply, withdraw, borrow and
//! repay. Each token step is isolated: a failure is recorded in the wallet
//! report and the runner moves on to the next token, phase and wallet.

use std::collections::HashMap;

use alloy::primitives::{TxHash, U256};
use anyhow::Result;
use clients_lendpool::{ChainError, LendingChain, RawCallPayload};
use rand::Rng;
use tracing::{error, info, info_span, warn, Instrument};
use utils::MICROS_PER_UNIT;

use crate::config::{CycleConfig, TokenConfig};
use crate::types::{Phase, RunReport, StepOutcome, StepReport, WalletReport};
use crate::wallets::WalletContext;

/// Runs the lending cycle with a fixed configuration.
///
/// Supply amounts are drawn from `rng`; pass a seeded generator for reproducible runs.
pub struct CycleRunner<'a, R> {
    config: &'a CycleConfig,
    rng: R,
}

impl<'a, R: Rng> CycleRunner<'a, R> {
    pub fn new(config: &'a CycleConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Processes wallets strictly one after another.
    ///
    /// # Arguments
    /// * `wallets` - Wallets in processing order
    /// * `connect` - Builds the signing chain client for a wallet
    ///
    /// # Returns
    /// A `RunReport` with one `WalletReport` per wallet that could be connected
    pub async fn run_all<C, F>(&mut self, wallets: &[WalletContext], mut connect: F) -> RunReport
    where
        C: LendingChain,
        F: FnMut(&WalletContext) -> Result<C>,
    {
        let mut run = RunReport::default();
        for wallet in wallets {
            info!(wallet = %wallet.address, "======== WALLET {} ========", wallet.address);
            match connect(wallet) {
                Ok(chain) => {
                    let span = info_span!("wallet", address = %wallet.address);
                    let report = self.run_wallet(&chain).instrument(span).await;
                    run.wallets.push(report);
                }
                Err(e) => {
                    error!(wallet = %wallet.address, "failed to set up wallet client: {e:#}");
                    run.unreachable.push((wallet.address, format!("{e:#}")));
                }
            }
        }
        run
    }

    /// Runs all six phases for the wallet behind `chain`.
    pub async fn run_wallet<C: LendingChain + ?Sized>(&mut self, chain: &C) -> WalletReport {
        let mut report = WalletReport::new(chain.account());
        // Populated by supply, consumed by withdraw, dropped with this wallet.
        let mut supplied: HashMap<String, U256> = HashMap::new();

        let config = self.config;
        let mut phase = Phase::Mint;
        while !phase.is_terminal() {
            for token in &config.tokens {
                let step = match phase {
                    Phase::Mint => self.mint(chain, token).await,
                    Phase::Approve => self.approve(chain, token).await,
                    Phase::Supply => self.supply(chain, token, &mut supplied).await,
                    Phase::Withdraw => self.withdraw(chain, token, &supplied).await,
                    Phase::Borrow | Phase::Repay => self.borrow_or_repay(chain, token, phase).await,
                    Phase::Done => break,
                };
                report.steps.push(step);
            }
            phase = phase.next();
        }

        info!(
            wallet = %report.address,
            confirmed = report.confirmed(),
            failed = report.failures().count(),
            "wallet finished"
        );
        report
    }

    async fn mint<C: LendingChain + ?Sized>(&self, chain: &C, token: &TokenConfig) -> StepReport {
        let phase = Phase::Mint;
        let amount = match utils::to_smallest_unit(&token.mint_amount, token.decimals) {
            Ok(amount) => amount,
            Err(e) => return invalid_amount(phase, token, &token.mint_amount, e),
        };
        info!(symbol = %token.symbol, %amount, "Minting {}", token.mint_amount);
        let submitted = chain.mint(token.address, chain.account(), amount).await;
        let outcome = settle(chain, phase, token, submitted).await;
        step(phase, token, amount, outcome)
    }

    async fn approve<C: LendingChain + ?Sized>(
        &self,
        chain: &C,
        token: &TokenConfig,
    ) -> StepReport {
        let phase = Phase::Approve;
        let router = self.config.router;
        let allowance = match chain.allowance(token.address, chain.account(), router).await {
            Ok(allowance) => allowance,
            Err(e) => {
                warn!(symbol = %token.symbol, "Allowance fetch error: {e}");
                U256::ZERO
            }
        };

        if allowance >= U256::MAX / U256::from(2u8) {
            info!(symbol = %token.symbol, %allowance, "Already unlimited approval");
            return step(
                phase,
                token,
                U256::MAX,
                StepOutcome::Skipped {
                    reason: "already unlimited approval".to_string(),
                },
            );
        }

        info!(symbol = %token.symbol, %allowance, "Approving router unlimited");
        let submitted = chain.approve(token.address, router, U256::MAX).await;
        let outcome = settle(chain, phase, token, submitted).await;
        step(phase, token, U256::MAX, outcome)
    }

    async fn supply<C: LendingChain + ?Sized>(
        &mut self,
        chain: &C,
        token: &TokenConfig,
        supplied: &mut HashMap<String, U256>,
    ) -> StepReport {
        let phase = Phase::Supply;
        let amount = self.random_supply_amount(token.decimals);
        // Recorded before submission; a failed supply still yields a withdraw of a tenth of it.
        supplied.insert(token.symbol.clone(), amount);

        info!(
            symbol = %token.symbol,
            %amount,
            "Supplying {}",
            utils::display_units(amount, token.decimals)
        );
        let submitted = chain
            .supply(
                token.address,
                amount,
                chain.account(),
                self.config.referral_code,
            )
            .await;
        let outcome = settle(chain, phase, token, submitted).await;
        step(phase, token, amount, outcome)
    }

    async fn withdraw<C: LendingChain + ?Sized>(
        &self,
        chain: &C,
        token: &TokenConfig,
        supplied: &HashMap<String, U256>,
    ) -> StepReport {
        let phase = Phase::Withdraw;
        let amount = withdraw_amount(supplied.get(&token.symbol).copied());

        info!(
            symbol = %token.symbol,
            %amount,
            "Withdrawing 10% = {}",
            utils::display_units(amount, token.decimals)
        );
        let submitted = chain
            .withdraw(token.address, amount, chain.account())
            .await;
        let outcome = settle(chain, phase, token, submitted).await;
        step(phase, token, amount, outcome)
    }

    async fn borrow_or_repay<C: LendingChain + ?Sized>(
        &self,
        chain: &C,
        token: &TokenConfig,
        phase: Phase,
    ) -> StepReport {
        let (amount_str, selector) = if phase == Phase::Borrow {
            (&token.borrow_amount, self.config.borrow_selector)
        } else {
            (&token.repay_amount, self.config.repay_selector)
        };
        let amount = match utils::to_smallest_unit(amount_str, token.decimals) {
            Ok(amount) => amount,
            Err(e) => return invalid_amount(phase, token, amount_str, e),
        };
        let (router, rate_mode, account) =
            (self.config.router, self.config.interest_rate_mode, chain.account());
        let payload = if phase == Phase::Borrow {
            RawCallPayload::borrow(router, selector, token.address, amount, rate_mode, account)
        } else {
            RawCallPayload::repay(router, selector, token.address, amount, rate_mode, account)
        };

        info!(symbol = %token.symbol, %amount, %selector, "{} {amount_str}", verb(phase));
        let submitted = chain.send_raw(&payload).await;
        let outcome = settle(chain, phase, token, submitted).await;
        step(phase, token, amount, outcome)
    }

    /// Uniform amount in `[supply_min, supply_max)` whole tokens, truncated to six
    /// fractional digits, scaled to the token's decimals.
    fn random_supply_amount(&mut self, decimals: u8) -> U256 {
        let min = self.config.supply_min.saturating_mul(MICROS_PER_UNIT);
        let max = self.config.supply_max.saturating_mul(MICROS_PER_UNIT);
        // Unvalidated configs may carry an empty range; fall back to the lower bound.
        let micros = if min < max {
            self.rng.random_range(min..max)
        } else {
            min
        };
        utils::micros_to_units(micros, decimals)
    }
}

/// A tenth of the recorded supply, truncated. A missing record withdraws zero.
pub fn withdraw_amount(supplied: Option<U256>) -> U256 {
    supplied.unwrap_or(U256::ZERO) / U256::from(10u8)
}

/// Logs the submission, waits for the receipt and converts the result into a step outcome.
async fn settle<C: LendingChain + ?Sized>(
    chain: &C,
    phase: Phase,
    token: &TokenConfig,
    submitted: Result<TxHash, ChainError>,
) -> StepOutcome {
    let tx_hash = match submitted {
        Ok(tx_hash) => tx_hash,
        Err(e) => {
            warn!(symbol = %token.symbol, %phase, "{} failed: {e}", verb(phase));
            return StepOutcome::Failed {
                reason: e.to_string(),
                tx_hash: None,
            };
        }
    };

    info!(symbol = %token.symbol, %phase, tx = %tx_hash, "{} tx submitted", verb(phase));
    match chain.wait_for_confirmation(tx_hash).await {
        Ok(()) => {
            info!(symbol = %token.symbol, %phase, tx = %tx_hash, "{} confirmed", verb(phase));
            StepOutcome::Confirmed { tx_hash }
        }
        Err(e) => {
            warn!(symbol = %token.symbol, %phase, tx = %tx_hash, "{} failed: {e}", verb(phase));
            StepOutcome::Failed {
                reason: e.to_string(),
                tx_hash: Some(tx_hash),
            }
        }
    }
}

fn invalid_amount(
    phase: Phase,
    token: &TokenConfig,
    value: &str,
    err: impl std::fmt::Display,
) -> StepReport {
    warn!(symbol = %token.symbol, %phase, "invalid amount {value:?}: {err}");
    step(
        phase,
        token,
        U256::ZERO,
        StepOutcome::Failed {
            reason: format!("invalid amount {value:?}: {err}"),
            tx_hash: None,
        },
    )
}

fn step(phase: Phase, token: &TokenConfig, amount: U256, outcome: StepOutcome) -> StepReport {
    StepReport {
        phase,
        symbol: token.symbol.clone(),
        amount,
        outcome,
    }
}

fn verb(phase: Phase) -> &'static str {
    match phase {
        Phase::Mint => "Mint",
        Phase::Approve => "Approve",
        Phase::Supply => "Supply",
        Phase::Withdraw => "Withdraw",
        Phase::Borrow => "Borrow",
        Phase::Repay => "Repay",
        Phase::Done => "Done",
    }
}
