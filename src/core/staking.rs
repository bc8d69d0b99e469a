//! Staking contract analysis
//!
//! Orchestrates contract reads, the historical log scan and aggregation into
//! the sections of a [`StakingReport`].

use alloy_primitives::U256;
use tracing::{debug, info};

use crate::core::aggregator::{direct_transfers, funding_metrics, FundingInputs};
use crate::core::scanner::LogScanner;
use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    BlockRange, DeploymentInfo, EmissionSchedule, FundingMetrics, LogEvent, RewardMetrics,
    StakingReport, TokenInfo,
};
use crate::providers::chain::ChainClient;
use crate::utils::constants::SECONDS_PER_DAY;
use crate::utils::decoder::{IStaking, IERC20};

/// Analyzer for the configured staking contract
pub struct StakingAnalyzer<'a> {
    chain: &'a ChainClient,
    config: &'a AppConfig,
}

impl<'a> StakingAnalyzer<'a> {
    pub fn new(chain: &'a ChainClient, config: &'a AppConfig) -> Self {
        Self { chain, config }
    }

    /// Confirm the contract exists and read the chain head
    pub async fn deployment_info(&self) -> AppResult<DeploymentInfo> {
        let contract = self.config.contract_address;
        let code = self.chain.bytecode(contract).await?;
        if code.is_empty() {
            return Err(AppError::contract_not_found(contract));
        }

        let header = self.chain.latest_block().await?;
        Ok(DeploymentInfo {
            current_block: header.number.to::<u64>(),
            block_timestamp: header.timestamp.to::<u64>(),
        })
    }

    /// Reward token metadata
    pub async fn token_info(&self) -> AppResult<TokenInfo> {
        let address = self.chain.staking_token(self.config.contract_address).await?;

        let (name, symbol, decimals) = tokio::try_join!(
            self.chain.read(address, IERC20::nameCall {}),
            self.chain.read(address, IERC20::symbolCall {}),
            self.chain.token_decimals(address),
        )?;

        Ok(TokenInfo {
            address,
            name: name._0,
            symbol: symbol._0,
            decimals,
        })
    }

    pub async fn reward_metrics(&self) -> AppResult<RewardMetrics> {
        let contract = self.config.contract_address;
        let (rate, token) = tokio::try_join!(
            self.chain.read(contract, IStaking::rewardRateCall {}),
            self.chain.staking_token(contract),
        )?;
        let decimals = self.chain.token_decimals(token).await?;

        Ok(reward_metrics(rate._0, self.config.block_time_secs, decimals))
    }

    /// Emission window with block estimates relative to `now` (unix seconds)
    pub async fn emission_schedule(&self, now: u64) -> AppResult<EmissionSchedule> {
        let contract = self.config.contract_address;
        let (start, end, latest) = tokio::try_join!(
            self.chain.read(contract, IStaking::emissionStartCall {}),
            self.chain.read(contract, IStaking::emissionEndCall {}),
            self.chain.block_number(),
        )?;

        Ok(emission_schedule(
            start._0.saturating_to::<u64>(),
            end._0.saturating_to::<u64>(),
            latest,
            now,
            self.config.block_time_secs,
        ))
    }

    /// Funding position, including a full scan from the deployment block to the head
    pub async fn funding(&self, now: u64) -> AppResult<FundingMetrics> {
        let contract = self.config.contract_address;

        let (rate, start, end, last_update, staked, fees, token) = tokio::try_join!(
            self.chain.read(contract, IStaking::rewardRateCall {}),
            self.chain.read(contract, IStaking::emissionStartCall {}),
            self.chain.read(contract, IStaking::emissionEndCall {}),
            self.chain.read(contract, IStaking::lastUpdateTimeCall {}),
            self.chain.read(contract, IStaking::totalStakedCall {}),
            self.chain.read(contract, IStaking::feesAccruedCall {}),
            self.chain.staking_token(contract),
        )?;

        let (balance, decimals, head) = tokio::try_join!(
            self.chain.read(token, IERC20::balanceOfCall { account: contract }),
            self.chain.token_decimals(token),
            self.chain.block_number(),
        )?;

        let scanner = LogScanner::new(self.chain, self.config.scan.clone());
        let outcome = scanner
            .scan(token, contract, BlockRange::new(self.config.deploy_block, head))
            .await?;

        if let Some(last) = outcome.events().iter().filter_map(LogEvent::block_number).max() {
            debug!("Most recent transfer or stake activity at block {}", last);
        }

        let history = direct_transfers(&outcome.transfers, &outcome.stake_events);
        info!(
            "💸 {} direct transfers out of {} collected ({} staking deposits excluded)",
            history.transfer_count,
            outcome.transfers.len(),
            outcome.transfers.len() - history.transfer_count
        );

        let inputs = FundingInputs {
            reward_rate: rate._0,
            emission_start: start._0.saturating_to::<u64>(),
            emission_end: end._0.saturating_to::<u64>(),
            last_update_time: last_update._0.saturating_to::<u64>(),
            total_staked: staked._0,
            fees_accrued: fees._0,
            contract_balance: balance._0,
            decimals,
            now,
        };
        Ok(funding_metrics(inputs, history))
    }

    /// Every report section, gathered concurrently
    pub async fn build_report(&self, now: u64) -> AppResult<StakingReport> {
        info!("🔮 Analyzing staking contract {}", self.config.contract_address);

        let (funding, deployment, rewards, token, emission) = tokio::try_join!(
            self.funding(now),
            self.deployment_info(),
            self.reward_metrics(),
            self.token_info(),
            self.emission_schedule(now),
        )?;

        Ok(StakingReport { funding, deployment, rewards, token, emission })
    }
}

/// Scale the per-second reward rate to blocks and days
pub fn reward_metrics(rate: U256, block_time_secs: u64, decimals: u8) -> RewardMetrics {
    RewardMetrics {
        rewards_per_second: rate,
        rewards_per_block: rate.saturating_mul(U256::from(block_time_secs)),
        rewards_per_day: rate.saturating_mul(U256::from(SECONDS_PER_DAY)),
        decimals,
    }
}

/// Estimate the blocks at which emission starts and ends
///
/// Blocks are extrapolated from `latest_block` at `now` with a fixed block time,
/// rounding the block offset down. Estimates that would fall before genesis are 0.
pub fn emission_schedule(
    start_time: u64,
    end_time: u64,
    latest_block: u64,
    now: u64,
    block_time_secs: u64,
) -> EmissionSchedule {
    let block_time = i128::from(block_time_secs.max(1));
    let latest = i128::from(latest_block);
    let now = i128::from(now);

    let start_block = latest - (now - i128::from(start_time)).div_euclid(block_time);
    let end_block = latest + (i128::from(end_time) - now).div_euclid(block_time);

    EmissionSchedule {
        start_time,
        end_time,
        start_block: clamp_block(start_block),
        end_block: clamp_block(end_block),
    }
}

fn clamp_block(block: i128) -> u64 {
    u64::try_from(block.max(0)).unwrap_or(u64::MAX)
}
