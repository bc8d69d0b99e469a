//! Staking Metrics Library
//!
//! Funding and emission analyzer for a reward-emitting staking contract:
//! - Reads emission window, reward rate, balances and token metadata
//! - Scans the full log history with an adaptive, shrink-on-failure batch size
//! - Separates direct funding transfers from staking deposits
//! - Reports how many tokens are still required to cover the emission

pub mod core;
pub mod models;
pub mod providers;
pub mod report;
pub mod utils;

pub use crate::core::{LogScanner, LogSource, ScanOutcome, StakingAnalyzer};
pub use models::{AppConfig, AppError, AppResult, ErrorCode, ScanConfig};
pub use providers::{ChainClient, RpcClient};
pub use report::Reporter;
