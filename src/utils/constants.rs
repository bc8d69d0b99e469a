//! Constants Module - Single Source of Truth
//!
//! Defaults, environment keys and time units used across the crate.
//! No magic numbers in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "StakingMetrics";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("StakingMetrics/", env!("CARGO_PKG_VERSION"));

// ============================================
// ENVIRONMENT KEYS
// ============================================

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_CONTRACT_ADDRESS: &str = "CONTRACT_ADDRESS";
pub const ENV_EXPLORER_URL: &str = "EXPLORER_URL";
pub const ENV_DEPLOY_BLOCK: &str = "DEPLOY_BLOCK";
pub const ENV_SCAN_MAX_BATCH: &str = "SCAN_MAX_BATCH";
pub const ENV_SCAN_MIN_BATCH: &str = "SCAN_MIN_BATCH";
pub const ENV_SCAN_DELAY_MS: &str = "SCAN_DELAY_MS";
pub const ENV_RPC_TIMEOUT_SECS: &str = "RPC_TIMEOUT_SECS";
pub const ENV_RPC_MAX_RETRIES: &str = "RPC_MAX_RETRIES";
pub const ENV_BLOCK_TIME_SECS: &str = "BLOCK_TIME_SECS";

// ============================================
// RPC CONSTANTS
// ============================================

/// Default timeout for RPC requests (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Transport-level attempts for rate limits / timeouts
pub const DEFAULT_RPC_MAX_RETRIES: u32 = 3;

/// Base retry delay in milliseconds (doubles per attempt)
pub const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Retry delay cap in milliseconds
pub const MAX_RETRY_DELAY_MS: u64 = 16000;

/// Jitter percentage applied to every retry delay
pub const RETRY_JITTER_PERCENT: u64 = 20;

// ============================================
// LOG SCAN CONSTANTS
// ============================================

/// Initial blocks per eth_getLogs query
pub const DEFAULT_MAX_BATCH_BLOCKS: u64 = 200_000;

/// Scan aborts once the batch size drops below this
pub const DEFAULT_MIN_BATCH_BLOCKS: u64 = 100;

/// Courtesy pause between successful chunks (milliseconds)
pub const DEFAULT_SCAN_DELAY_MS: u64 = 500;

// ============================================
// TIME UNITS
// ============================================

/// Mainnet slot time
pub const DEFAULT_BLOCK_TIME_SECS: u64 = 12;

pub const SECONDS_PER_HOUR: u64 = 3_600;

pub const SECONDS_PER_DAY: u64 = 86_400;
