//! Type definitions for the staking analyzer
//! Decoded log events, scan output and the metrics rendered in the report

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive block range `from..=to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Number of blocks covered (0 for an inverted range)
    pub fn width(&self) -> u64 {
        if self.from > self.to {
            0
        } else {
            (self.to - self.from).saturating_add(1)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// ERC20 `Transfer` into the staking contract
///
/// Argument fields are `None` when the log data could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLog {
    pub transaction_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub from: Option<Address>,
    pub value: Option<U256>,
}

/// `Staked(user, amount)` emitted by the staking contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLog {
    pub transaction_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub user: Option<Address>,
    pub amount: Option<U256>,
}

/// Any log the scanner collects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    Transfer(TransferLog),
    Stake(StakeLog),
}

impl LogEvent {
    pub fn block_number(&self) -> Option<u64> {
        match self {
            LogEvent::Transfer(log) => log.block_number,
            LogEvent::Stake(log) => log.block_number,
        }
    }
}

impl From<TransferLog> for LogEvent {
    fn from(log: TransferLog) -> Self {
        LogEvent::Transfer(log)
    }
}

impl From<StakeLog> for LogEvent {
    fn from(log: StakeLog) -> Self {
        LogEvent::Stake(log)
    }
}

/// A direct (non-staking) funding transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: Option<Address>,
    pub amount: U256,
    pub block_number: Option<u64>,
}

impl From<&TransferLog> for TransferRecord {
    fn from(log: &TransferLog) -> Self {
        Self {
            from: log.from,
            amount: log.value.unwrap_or(U256::ZERO),
            block_number: log.block_number,
        }
    }
}

/// Aggregated direct transfers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHistory {
    pub total_transferred: U256,
    pub transfer_count: usize,
    pub transfers: Vec<TransferRecord>,
}

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Contract presence check plus chain head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub current_block: u64,
    /// Unix seconds
    pub block_timestamp: u64,
}

/// Reward emission rates in raw token units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardMetrics {
    pub rewards_per_second: U256,
    pub rewards_per_block: U256,
    pub rewards_per_day: U256,
    pub decimals: u8,
}

/// Emission window with estimated block numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSchedule {
    /// Unix seconds
    pub start_time: u64,
    /// Unix seconds
    pub end_time: u64,
    pub start_block: u64,
    pub end_block: u64,
}

/// Funding position of the staking contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingMetrics {
    pub required_tokens: U256,
    /// Seconds until emission end; zero or negative once emission has ended
    pub time_left: i64,
    pub total_seconds: u64,
    pub total_tokens_needed: U256,
    pub total_transferred: U256,
    pub transfer_count: usize,
    pub transfers: Vec<TransferRecord>,
    /// `balance - total_staked - fees_accrued`, floored at zero
    pub free_balance: U256,
    /// Amount by which staked principal plus fees exceed the balance
    pub balance_deficit: U256,
    /// When rewards paid at `reward_rate` from `emission_start` exhaust the
    /// transferred funding (unix seconds, capped at `emission_end`)
    pub funded_until: u64,
    pub emission_start: u64,
    pub emission_end: u64,
    pub last_update_time: u64,
    pub reward_rate: U256,
    pub decimals: u8,
}

impl FundingMetrics {
    pub fn needs_funding(&self) -> bool {
        !self.required_tokens.is_zero()
    }

    pub fn emission_ended(&self) -> bool {
        self.time_left <= 0
    }
}

/// Everything the report prints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingReport {
    pub funding: FundingMetrics,
    pub deployment: DeploymentInfo,
    pub rewards: RewardMetrics,
    pub token: TokenInfo,
    pub emission: EmissionSchedule,
}
