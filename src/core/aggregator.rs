//! Metrics aggregation
//!
//! Separates direct funding transfers from staking deposits and turns on-chain
//! reads into the funding position of the contract.

use alloy_primitives::{B256, U256};
use std::collections::HashSet;

use crate::models::types::{FundingMetrics, StakeLog, TransferHistory, TransferLog, TransferRecord};

/// Keep only transfers that did not happen inside a staking transaction
///
/// A transfer without a transaction hash can never match a stake and counts as direct.
pub fn direct_transfers(transfers: &[TransferLog], stake_events: &[StakeLog]) -> TransferHistory {
    let staking_tx_hashes: HashSet<B256> =
        stake_events.iter().filter_map(|log| log.transaction_hash).collect();

    let transfers: Vec<TransferRecord> = transfers
        .iter()
        .filter(|log| match log.transaction_hash {
            Some(hash) => !staking_tx_hashes.contains(&hash),
            None => true,
        })
        .map(TransferRecord::from)
        .collect();

    let total_transferred = transfers
        .iter()
        .fold(U256::ZERO, |sum, record| sum.saturating_add(record.amount));

    TransferHistory {
        total_transferred,
        transfer_count: transfers.len(),
        transfers,
    }
}

/// On-chain values the funding calculation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingInputs {
    pub reward_rate: U256,
    pub emission_start: u64,
    pub emission_end: u64,
    pub last_update_time: u64,
    pub total_staked: U256,
    pub fees_accrued: U256,
    pub contract_balance: U256,
    pub decimals: u8,
    /// Unix seconds
    pub now: u64,
}

/// Combine reads with the transfer history
pub fn funding_metrics(inputs: FundingInputs, history: TransferHistory) -> FundingMetrics {
    let total_seconds = inputs.emission_end.saturating_sub(inputs.emission_start);
    let total_tokens_needed = inputs.reward_rate.saturating_mul(U256::from(total_seconds));
    let required_tokens = total_tokens_needed.saturating_sub(history.total_transferred);

    let committed = inputs.total_staked.saturating_add(inputs.fees_accrued);
    let free_balance = inputs.contract_balance.saturating_sub(committed);
    let balance_deficit = committed.saturating_sub(inputs.contract_balance);

    let funded_until = depletion_time(
        inputs.emission_start,
        inputs.emission_end,
        inputs.reward_rate,
        history.total_transferred,
    );

    let time_left = i64::try_from(inputs.emission_end)
        .unwrap_or(i64::MAX)
        .saturating_sub(i64::try_from(inputs.now).unwrap_or(i64::MAX));

    FundingMetrics {
        required_tokens,
        time_left,
        total_seconds,
        total_tokens_needed,
        total_transferred: history.total_transferred,
        transfer_count: history.transfer_count,
        transfers: history.transfers,
        free_balance,
        balance_deficit,
        funded_until,
        emission_start: inputs.emission_start,
        emission_end: inputs.emission_end,
        last_update_time: inputs.last_update_time,
        reward_rate: inputs.reward_rate,
        decimals: inputs.decimals,
    }
}

/// Unix time at which `funding` runs out when paid at `rate` per second from `start`
///
/// Never later than `end`; a zero rate never depletes.
pub fn depletion_time(start: u64, end: u64, rate: U256, funding: U256) -> u64 {
    if rate.is_zero() || end <= start {
        return end.max(start);
    }
    let covered = funding / rate;
    let covered = covered.saturating_to::<u64>();
    start.saturating_add(covered).min(end)
}
