//! Integration tests for Staking Metrics

use alloy_primitives::{address, Address, B256, U256};
use staking_metrics::{
    core::{direct_transfers, funding_metrics, FundingInputs, LogScanner, LogSource},
    models::{
        config::AppConfig,
        errors::{AppError, AppResult, ErrorCode},
        types::{BlockRange, StakeLog, TransferLog},
    },
    ScanConfig,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;
use std::time::Duration;

const TOKEN: Address = address!("1111111111111111111111111111111111111111");
const STAKING: Address = address!("2222222222222222222222222222222222222222");

/// Deterministic chain: a transfer every 7th block, and every 21st block's
/// transfer is a staking deposit (a `Staked` log in the same transaction).
/// Queries wider than `max_width` fail like an RPC range limit.
struct SyntheticChain {
    max_width: u64,
    queried: Mutex<Vec<BlockRange>>,
}

impl SyntheticChain {
    fn new(max_width: u64) -> Self {
        Self { max_width, queried: Mutex::new(Vec::new()) }
    }

    fn tx(block: u64) -> B256 {
        B256::left_padding_from(&block.to_be_bytes())
    }

    fn check(&self, range: BlockRange) -> AppResult<()> {
        if range.width() > self.max_width {
            return Err(AppError::rpc_error(-32005, "query returned more than 10000 results"));
        }
        Ok(())
    }
}

impl LogSource for SyntheticChain {
    async fn transfer_logs(
        &self,
        _token: Address,
        _recipient: Address,
        range: BlockRange,
    ) -> AppResult<Vec<TransferLog>> {
        self.queried.lock().unwrap().push(range);
        self.check(range)?;
        Ok((range.from..=range.to)
            .filter(|block| block % 7 == 0)
            .map(|block| TransferLog {
                transaction_hash: Some(Self::tx(block)),
                block_number: Some(block),
                from: Some(Address::repeat_byte(0xaa)),
                value: Some(U256::from(10u64)),
            })
            .collect())
    }

    async fn stake_logs(&self, _contract: Address, range: BlockRange) -> AppResult<Vec<StakeLog>> {
        self.check(range)?;
        Ok((range.from..=range.to)
            .filter(|block| block % 21 == 0)
            .map(|block| StakeLog {
                transaction_hash: Some(Self::tx(block)),
                block_number: Some(block),
                user: Some(Address::repeat_byte(0xbb)),
                amount: Some(U256::from(10u64)),
            })
            .collect())
    }
}

/// Every query fails regardless of its size
struct BrokenChain;

impl LogSource for BrokenChain {
    async fn transfer_logs(
        &self,
        _token: Address,
        _recipient: Address,
        _range: BlockRange,
    ) -> AppResult<Vec<TransferLog>> {
        Err(AppError::rpc_error(-32000, "backend unavailable"))
    }

    async fn stake_logs(&self, _contract: Address, _range: BlockRange) -> AppResult<Vec<StakeLog>> {
        Ok(Vec::new())
    }
}

fn scan_config(max: u64, min: u64) -> ScanConfig {
    ScanConfig { max_batch_blocks: max, min_batch_blocks: min, chunk_delay: Duration::ZERO }
}

fn assert_exact_cover(chunks: &[BlockRange], range: BlockRange) {
    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].from, range.from);
    assert_eq!(chunks[chunks.len() - 1].to, range.to);
    for pair in chunks.windows(2) {
        assert_eq!(pair[1].from, pair[0].to + 1, "gap or overlap between {} and {}", pair[0], pair[1]);
    }
    let covered: u64 = chunks.iter().map(BlockRange::width).sum();
    assert_eq!(covered, range.width());
}

#[tokio::test]
async fn test_scan_covers_every_block_once() {
    let cases = [
        (BlockRange::new(0, 0), 100, 10, 1_000),
        (BlockRange::new(5, 5_004), 1_000, 10, 1_000),
        (BlockRange::new(1_000, 9_999), 4_096, 16, 300),
        (BlockRange::new(123, 4_567), 777, 1, 50),
    ];

    for (range, max, min, limit) in cases {
        let chain = SyntheticChain::new(limit);
        let outcome = LogScanner::new(&chain, scan_config(max, min))
            .scan(TOKEN, STAKING, range)
            .await
            .unwrap();

        assert_exact_cover(&outcome.chunks, range);
        assert!(outcome.chunks.iter().all(|chunk| chunk.width() <= limit));
    }
}

#[tokio::test]
async fn test_result_independent_of_initial_batch() {
    let range = BlockRange::new(0, 2_000);

    let wide = SyntheticChain::new(u64::MAX);
    let narrow = SyntheticChain::new(u64::MAX);
    let shrinking = SyntheticChain::new(90);

    let a = LogScanner::new(&wide, scan_config(10_000, 1)).scan(TOKEN, STAKING, range).await.unwrap();
    let b = LogScanner::new(&narrow, scan_config(64, 1)).scan(TOKEN, STAKING, range).await.unwrap();
    let c = LogScanner::new(&shrinking, scan_config(1_000, 1)).scan(TOKEN, STAKING, range).await.unwrap();

    assert_eq!(a.chunks.len(), 1);
    assert_eq!(a.transfers, b.transfers);
    assert_eq!(a.transfers, c.transfers);
    assert_eq!(a.stake_events, b.stake_events);
    assert_eq!(a.stake_events, c.stake_events);
    // 0, 7, ..., 1995
    assert_eq!(a.transfers.len(), 286);
    assert_eq!(a.events().len(), a.transfers.len() + a.stake_events.len());
}

#[tokio::test]
async fn test_batch_never_grows_back() {
    let chain = SyntheticChain::new(300);
    let outcome = LogScanner::new(&chain, scan_config(1_000, 10))
        .scan(TOKEN, STAKING, BlockRange::new(0, 2_999))
        .await
        .unwrap();

    // 1000 -> 500 -> 250, then 250 for the remaining chunks
    assert!(outcome.chunks.iter().all(|chunk| chunk.width() == 250));
    assert_eq!(outcome.chunks.len(), 12);
    assert_eq!(chain.queried.lock().unwrap().len(), 14);
}

#[tokio::test]
async fn test_scan_aborts_without_partial_results() {
    let err = LogScanner::new(&BrokenChain, scan_config(1_000, 100))
        .scan(TOKEN, STAKING, BlockRange::new(50, 10_000))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ScanAborted);
    assert!(err.message.contains("50..=174"), "{}", err.message);
    let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
    assert!(cause.contains("backend unavailable"));
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let chain = SyntheticChain::new(u64::MAX);
    let err = LogScanner::new(&chain, scan_config(100, 10))
        .scan(TOKEN, STAKING, BlockRange::new(500, 499))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ScanInvalidRange);
    assert!(chain.queried.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_scan_to_funding_pipeline() {
    let chain = SyntheticChain::new(500);
    let outcome = LogScanner::new(&chain, scan_config(2_000, 10))
        .scan(TOKEN, STAKING, BlockRange::new(1, 210))
        .await
        .unwrap();

    // 30 transfers (7..=210 step 7), 10 of them at multiples of 21 are stakes
    assert_eq!(outcome.transfers.len(), 30);
    assert_eq!(outcome.stake_events.len(), 10);

    let history = direct_transfers(&outcome.transfers, &outcome.stake_events);
    assert_eq!(history.transfer_count, 20);
    assert_eq!(history.total_transferred, U256::from(200u64));

    let inputs = FundingInputs {
        reward_rate: U256::from(1u64),
        emission_start: 1_000,
        emission_end: 1_500,
        last_update_time: 1_000,
        total_staked: U256::from(100u64),
        fees_accrued: U256::from(20u64),
        contract_balance: U256::from(400u64),
        decimals: 18,
        now: 1_200,
    };
    let metrics = funding_metrics(inputs, history);

    assert_eq!(metrics.total_tokens_needed, U256::from(500u64));
    assert_eq!(metrics.required_tokens, U256::from(300u64));
    assert_eq!(metrics.free_balance, U256::from(280u64));
    assert_eq!(metrics.time_left, 300);
    assert!(metrics.needs_funding());
}

#[test]
fn test_config_from_lookup() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("RPC_URL", "https://eth-mainnet.g.alchemy.com/v2/secret"),
        ("CONTRACT_ADDRESS", "0x2222222222222222222222222222222222222222"),
        ("EXPLORER_URL", "https://etherscan.io"),
        ("DEPLOY_BLOCK", "18_500_000"),
        ("SCAN_MAX_BATCH", "50000"),
    ]);

    let config = AppConfig::from_lookup(|key: &str| vars.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(config.contract_address, STAKING);
    assert_eq!(config.explorer_url, "https://etherscan.io/");
    assert_eq!(config.deploy_block, 18_500_000);
    assert_eq!(config.scan.max_batch_blocks, 50_000);
    assert_eq!(config.scan.min_batch_blocks, 100);
    assert_eq!(config.block_time_secs, 12);
    assert_eq!(config.block_countdown_url(19_000_000), "https://etherscan.io/block/countdown/19000000");
}

#[test]
fn test_config_rejects_bad_address() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("RPC_URL", "http://localhost:8545"),
        ("CONTRACT_ADDRESS", "0x1234"),
        ("EXPLORER_URL", "https://etherscan.io/"),
        ("DEPLOY_BLOCK", "1"),
    ]);

    let err = AppConfig::from_lookup(|key: &str| vars.get(key).map(|v| v.to_string())).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalidAddress);
}
