//! Terminal report for a [`StakingReport`]

use std::fmt::Write;

use crate::models::config::AppConfig;
use crate::models::types::StakingReport;
use crate::utils::format::{
    clickable_link, format_timestamp, format_token_amount, split_days_hours,
};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Renders analysis results with explorer links from the config
pub struct Reporter<'a> {
    config: &'a AppConfig,
}

impl<'a> Reporter<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, report: &StakingReport) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_report(&mut out, report);
        out
    }

    fn write_report(&self, out: &mut String, report: &StakingReport) -> std::fmt::Result {
        let StakingReport { funding, deployment, rewards, token, emission } = report;
        let decimals = token.decimals;
        let contract = self.config.contract_address;

        writeln!(out, "\n📊 Staking Contract Analysis")?;
        writeln!(out, "{}", RULE)?;

        writeln!(out, "\n💠 Token Details")?;
        writeln!(out, "   Name: {}", token.name)?;
        writeln!(out, "   Symbol: {}", token.symbol)?;
        writeln!(
            out,
            "   Token Address: {}",
            clickable_link(&token.address.to_string(), &self.config.address_url(&token.address))
        )?;
        writeln!(
            out,
            "   Staking Contract: {}",
            clickable_link(&contract.to_string(), &self.config.address_url(&contract))
        )?;

        writeln!(out, "\n🚀 Contract Status")?;
        writeln!(out, "   Current Block: #{}", deployment.current_block)?;
        writeln!(out, "   Block Time: {}", format_timestamp(deployment.block_timestamp))?;

        writeln!(out, "\n💰 Reward Distribution")?;
        writeln!(
            out,
            "   Per Second: {} {}",
            format_token_amount(rewards.rewards_per_second, rewards.decimals),
            token.symbol
        )?;
        writeln!(out, "   └─ Raw: {}", rewards.rewards_per_second)?;
        writeln!(
            out,
            "   Per Block (~{}s): {} {}",
            self.config.block_time_secs,
            format_token_amount(rewards.rewards_per_block, rewards.decimals),
            token.symbol
        )?;
        writeln!(out, "   └─ Raw: {}", rewards.rewards_per_block)?;
        writeln!(
            out,
            "   Per Day: {} {}",
            format_token_amount(rewards.rewards_per_day, rewards.decimals),
            token.symbol
        )?;
        writeln!(out, "   └─ Raw: {}", rewards.rewards_per_day)?;

        writeln!(out, "\n⏳ Emission Schedule")?;
        writeln!(out, "   Start: {}", format_timestamp(emission.start_time))?;
        writeln!(out, "   Start Block: {}", self.block_link(emission.start_block))?;
        writeln!(out, "   End: {}", format_timestamp(emission.end_time))?;
        writeln!(out, "   End Block: {}", self.block_link(emission.end_block))?;

        let (days, hours) = split_days_hours(funding.time_left.unsigned_abs());
        if funding.emission_ended() {
            writeln!(out, "   Status: Emission ended {} days and {} hours ago", days, hours)?;
        } else {
            writeln!(out, "   Time Remaining: {} days, {} hours", days, hours)?;
        }

        writeln!(out, "\n💎 Current Status")?;
        writeln!(out, "   Last Reward Update: {}", format_timestamp(funding.last_update_time))?;
        writeln!(
            out,
            "   Direct Transfers: {} ({} {})",
            funding.transfer_count,
            format_token_amount(funding.total_transferred, decimals),
            token.symbol
        )?;
        writeln!(
            out,
            "   Emission Total: {} {}",
            format_token_amount(funding.total_tokens_needed, decimals),
            token.symbol
        )?;
        writeln!(
            out,
            "   Free Balance: {} {}",
            format_token_amount(funding.free_balance, decimals),
            token.symbol
        )?;
        if !funding.balance_deficit.is_zero() {
            writeln!(
                out,
                "   ⚠️ Balance Deficit: {} {} (staked principal and fees exceed balance)",
                format_token_amount(funding.balance_deficit, decimals),
                token.symbol
            )?;
        }

        if funding.needs_funding() {
            writeln!(out, "\n⚠️ Additional Funding Required:")?;
            writeln!(out, "   Transferred funding lasts until {}", format_timestamp(funding.funded_until))?;
            writeln!(
                out,
                "   {} {} needed to complete emission schedule",
                format_token_amount(funding.required_tokens, decimals),
                token.symbol
            )?;
        } else {
            writeln!(out, "\n✅ Contract is sufficiently funded for the remaining period")?;
        }

        writeln!(out, "\n *Date times are approximate, block numbers are estimates from block time")?;
        Ok(())
    }

    fn block_link(&self, block: u64) -> String {
        clickable_link(&format!("#{}", block), &self.config.block_countdown_url(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ScanConfig;
    use crate::models::types::{
        DeploymentInfo, EmissionSchedule, FundingMetrics, RewardMetrics, TokenInfo,
    };
    use alloy_primitives::{Address, U256};
    use std::time::Duration;

    const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    fn config() -> AppConfig {
        AppConfig {
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: Address::repeat_byte(0x22),
            explorer_url: "https://etherscan.io/".to_string(),
            deploy_block: 0,
            rpc_timeout: Duration::from_secs(10),
            rpc_max_retries: 3,
            block_time_secs: 12,
            scan: ScanConfig::default(),
        }
    }

    fn report(required: u128, time_left: i64, deficit: u128) -> StakingReport {
        StakingReport {
            funding: FundingMetrics {
                required_tokens: U256::from(required),
                time_left,
                total_seconds: 1_000,
                total_tokens_needed: U256::from(10 * ONE_TOKEN),
                total_transferred: U256::from(4 * ONE_TOKEN),
                transfer_count: 2,
                transfers: Vec::new(),
                free_balance: U256::from(ONE_TOKEN / 2),
                balance_deficit: U256::from(deficit),
                funded_until: 1_700_000_400,
                emission_start: 1_700_000_000,
                emission_end: 1_700_001_000,
                last_update_time: 1_700_000_500,
                reward_rate: U256::from(ONE_TOKEN / 100),
                decimals: 18,
            },
            deployment: DeploymentInfo { current_block: 19_000_000, block_timestamp: 1_700_000_500 },
            rewards: RewardMetrics {
                rewards_per_second: U256::from(ONE_TOKEN / 100),
                rewards_per_block: U256::from(12 * ONE_TOKEN / 100),
                rewards_per_day: U256::from(864 * ONE_TOKEN),
                decimals: 18,
            },
            token: TokenInfo {
                address: Address::repeat_byte(0x11),
                name: "Basic Token".to_string(),
                symbol: "BASIC".to_string(),
                decimals: 18,
            },
            emission: EmissionSchedule {
                start_time: 1_700_000_000,
                end_time: 1_700_001_000,
                start_block: 18_999_959,
                end_block: 19_000_041,
            },
        }
    }

    #[test]
    fn test_underfunded_report() {
        let out = Reporter::new(&config()).render(&report(6 * ONE_TOKEN, 2 * 86_400 + 3 * 3_600, 0));

        assert!(out.contains("Name: Basic Token"));
        assert!(out.contains("Per Second: 0.01 BASIC"));
        assert!(out.contains("Per Day: 864 BASIC"));
        assert!(out.contains("Time Remaining: 2 days, 3 hours"));
        assert!(out.contains("Free Balance: 0.5 BASIC"));
        assert!(out.contains(&format!(
            "Last Reward Update: {}",
            format_timestamp(1_700_000_500)
        )));
        assert!(out.contains("6 BASIC needed to complete emission schedule"));
        assert!(out.contains("https://etherscan.io/block/countdown/19000041"));
        assert!(!out.contains("Balance Deficit"));
    }

    #[test]
    fn test_funded_and_ended_report() {
        let out = Reporter::new(&config()).render(&report(0, -(86_400 + 7_200), ONE_TOKEN));

        assert!(out.contains("Emission ended 1 days and 2 hours ago"));
        assert!(out.contains("sufficiently funded"));
        assert!(out.contains("Balance Deficit: 1 BASIC"));
        assert!(!out.contains("Additional Funding Required"));
    }

    #[test]
    fn test_links_use_address_pages() {
        let cfg = config();
        let out = Reporter::new(&cfg).render(&report(0, 10, 0));
        let token_url = cfg.address_url(&Address::repeat_byte(0x11));
        assert!(out.contains(&token_url));
        assert!(token_url.starts_with("https://etherscan.io/address/0x"));
    }
}
