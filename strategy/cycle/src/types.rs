//! Phase state machine and per-step reporting types.

use std::fmt;

use alloy::primitives::{Address, TxHash, U256};

/// The per-wallet state machine. Phases only move forward; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Mint,
    Approve,
    Supply,
    Withdraw,
    Borrow,
    Repay,
    Done,
}

impl Phase {
    /// Action phases in execution order.
    pub const ACTIONS: [Phase; 6] = [
        Phase::Mint,
        Phase::Approve,
        Phase::Supply,
        Phase::Withdraw,
        Phase::Borrow,
        Phase::Repay,
    ];

    /// Transition table. The next phase never depends on step outcomes.
    pub fn next(self) -> Phase {
        match self {
            Phase::Mint => Phase::Approve,
            Phase::Approve => Phase::Supply,
            Phase::Supply => Phase::Withdraw,
            Phase::Withdraw => Phase::Borrow,
            Phase::Borrow => Phase::Repay,
            Phase::Repay | Phase::Done => Phase::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Mint => "mint",
            Phase::Approve => "approve",
            Phase::Supply => "supply",
            Phase::Withdraw => "withdraw",
            Phase::Borrow => "borrow",
            Phase::Repay => "repay",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one token step within a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Submitted and mined successfully
    Confirmed { tx_hash: TxHash },
    /// Nothing was submitted on purpose (e.g. allowance already sufficient)
    Skipped { reason: String },
    /// Submission or confirmation failed; `tx_hash` is set when the node accepted the transaction
    Failed {
        reason: String,
        tx_hash: Option<TxHash>,
    },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            StepOutcome::Confirmed { tx_hash } => Some(*tx_hash),
            StepOutcome::Failed { tx_hash, .. } => *tx_hash,
            StepOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub phase: Phase,
    pub symbol: String,
    /// Amount in the token's smallest unit
    pub amount: U256,
    pub outcome: StepOutcome,
}

/// Everything that happened for one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletReport {
    pub address: Address,
    pub steps: Vec<StepReport>,
}

impl WalletReport {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            steps: Vec::new(),
        }
    }

    /// Steps of `phase` where a transaction was attempted (skips excluded).
    pub fn attempts(&self, phase: Phase) -> usize {
        self.steps
            .iter()
            .filter(|s| s.phase == phase && !matches!(s.outcome, StepOutcome::Skipped { .. }))
            .count()
    }

    pub fn confirmed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Confirmed { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.outcome.is_failure())
    }

    pub fn step(&self, phase: Phase, symbol: &str) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| s.phase == phase && s.symbol == symbol)
    }
}

/// Aggregate over all wallets of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub wallets: Vec<WalletReport>,
    /// Wallets whose client could not be constructed, with the reason
    pub unreachable: Vec<(Address, String)>,
}

impl RunReport {
    pub fn attempts(&self, phase: Phase) -> usize {
        self.wallets.iter().map(|w| w.attempts(phase)).sum()
    }

    pub fn confirmed(&self) -> usize {
        self.wallets.iter().map(WalletReport::confirmed).sum()
    }

    pub fn failed(&self) -> usize {
        self.wallets.iter().map(|w| w.failures().count()).sum()
    }
}
