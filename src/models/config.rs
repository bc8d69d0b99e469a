//! Configuration module for the staking analyzer
//!
//! Built once in `main` from the environment (after `.env` is loaded) and passed
//! down by reference. Uses keys and defaults from utils/constants.rs.

use alloy_primitives::Address;
use std::str::FromStr;
use std::time::Duration;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_BLOCK_TIME_SECS, DEFAULT_MAX_BATCH_BLOCKS, DEFAULT_MIN_BATCH_BLOCKS,
    DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_SCAN_DELAY_MS, ENV_BLOCK_TIME_SECS,
    ENV_CONTRACT_ADDRESS, ENV_DEPLOY_BLOCK, ENV_EXPLORER_URL, ENV_RPC_MAX_RETRIES, ENV_RPC_TIMEOUT_SECS,
    ENV_RPC_URL, ENV_SCAN_DELAY_MS, ENV_SCAN_MAX_BATCH, ENV_SCAN_MIN_BATCH,
};

/// Adaptive log scan tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Initial blocks per query
    pub max_batch_blocks: u64,
    /// Floor; shrinking below this aborts the scan
    pub min_batch_blocks: u64,
    /// Pause between successful chunks
    pub chunk_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_batch_blocks: DEFAULT_MAX_BATCH_BLOCKS,
            min_batch_blocks: DEFAULT_MIN_BATCH_BLOCKS,
            chunk_delay: Duration::from_millis(DEFAULT_SCAN_DELAY_MS),
        }
    }
}

impl ScanConfig {
    /// Reject tunings that could never complete a scan
    pub fn validate(&self) -> AppResult<()> {
        if self.min_batch_blocks == 0 {
            return Err(AppError::invalid_config(ENV_SCAN_MIN_BATCH, "must be at least 1"));
        }
        if self.max_batch_blocks < self.min_batch_blocks {
            return Err(AppError::invalid_config(
                ENV_SCAN_MAX_BATCH,
                format!(
                    "{} is below {} ({})",
                    self.max_batch_blocks, ENV_SCAN_MIN_BATCH, self.min_batch_blocks
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration for the staking analyzer
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP JSON-RPC endpoint
    pub rpc_url: String,

    /// Staking contract under analysis
    pub contract_address: Address,

    /// Block explorer base URL, always ending in `/`
    pub explorer_url: String,

    /// Block the staking contract was deployed in (scan start)
    pub deploy_block: u64,

    /// Timeout for a single RPC request
    pub rpc_timeout: Duration,

    /// Transport retries for rate limits / timeouts
    pub rpc_max_retries: u32,

    /// Seconds per block, used for per-block rewards and block estimates
    pub block_time_secs: u64,

    /// Log scan tuning
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> AppResult<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::missing_env(key))
        };

        let rpc_url = required(ENV_RPC_URL)?;
        validate_url(ENV_RPC_URL, &rpc_url)?;

        let contract_address = parse_address(&required(ENV_CONTRACT_ADDRESS)?)?;

        let explorer_url = required(ENV_EXPLORER_URL)?;
        validate_url(ENV_EXPLORER_URL, &explorer_url)?;
        let explorer_url = normalize_explorer_url(&explorer_url);

        let deploy_block = parse_number(ENV_DEPLOY_BLOCK, &required(ENV_DEPLOY_BLOCK)?)?;

        let optional = |key: &str, default: u64| -> AppResult<u64> {
            match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(raw) => parse_number(key, &raw),
                None => Ok(default),
            }
        };

        let scan = ScanConfig {
            max_batch_blocks: optional(ENV_SCAN_MAX_BATCH, DEFAULT_MAX_BATCH_BLOCKS)?,
            min_batch_blocks: optional(ENV_SCAN_MIN_BATCH, DEFAULT_MIN_BATCH_BLOCKS)?,
            chunk_delay: Duration::from_millis(optional(ENV_SCAN_DELAY_MS, DEFAULT_SCAN_DELAY_MS)?),
        };
        scan.validate()?;

        let rpc_timeout = Duration::from_secs(optional(ENV_RPC_TIMEOUT_SECS, DEFAULT_RPC_TIMEOUT_SECS)?);

        let rpc_max_retries = optional(ENV_RPC_MAX_RETRIES, DEFAULT_RPC_MAX_RETRIES as u64)?;
        let rpc_max_retries = u32::try_from(rpc_max_retries)
            .map_err(|_| AppError::invalid_config(ENV_RPC_MAX_RETRIES, "value too large"))?;

        let block_time_secs = optional(ENV_BLOCK_TIME_SECS, DEFAULT_BLOCK_TIME_SECS)?;
        if block_time_secs == 0 {
            return Err(AppError::invalid_config(ENV_BLOCK_TIME_SECS, "must be at least 1"));
        }

        Ok(Self {
            rpc_url,
            contract_address,
            explorer_url,
            deploy_block,
            rpc_timeout,
            rpc_max_retries,
            block_time_secs,
            scan,
        })
    }

    /// Explorer page for an address
    pub fn address_url(&self, address: &Address) -> String {
        format!("{}address/{}", self.explorer_url, address)
    }

    /// Explorer countdown page for a (possibly future) block
    pub fn block_countdown_url(&self, block: u64) -> String {
        format!("{}block/countdown/{}", self.explorer_url, block)
    }
}

/// Accepts 40 hex digits with or without a `0x` prefix
pub fn parse_address(raw: &str) -> AppResult<Address> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")).unwrap_or(raw);
    if digits.len() != 40 || hex::decode(digits).is_err() {
        return Err(AppError::invalid_address(raw));
    }
    Address::from_str(digits).map_err(|_| AppError::invalid_address(raw))
}

/// Ensure the explorer base ends with a slash so paths can be appended
pub fn normalize_explorer_url(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    }
}

fn validate_url(key: &str, url: &str) -> AppResult<()> {
    let known_scheme = ["http://", "https://", "ws://", "wss://"]
        .iter()
        .any(|scheme| url.starts_with(scheme));
    if !known_scheme {
        return Err(AppError::invalid_config(key, format!("'{}' is not an http(s) or ws(s) URL", url)));
    }
    Ok(())
}

fn parse_number(key: &str, raw: &str) -> AppResult<u64> {
    raw.replace('_', "")
        .parse::<u64>()
        .map_err(|e| AppError::invalid_config(key, format!("'{}' is not a block/number value ({})", raw, e)))
}
