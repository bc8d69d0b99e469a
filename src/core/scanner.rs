//! Adaptive historical log scanner
//!
//! Walks `[start, end]` in chunks, querying token transfers into the staking
//! contract and the contract's `Staked` events concurrently for each chunk.
//!
//! Policy:
//! 1. Start at the configured maximum batch size
//! 2. On success: keep both result sets, advance past the chunk, pause briefly
//! 3. On failure: halve the batch size and retry the same cursor
//! 4. Batch size below the floor: abort the whole scan (no partial results)
//!
//! The batch size never grows back once it has shrunk.

use alloy_primitives::Address;
use futures_util::future::try_join;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::models::config::ScanConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{BlockRange, LogEvent, StakeLog, TransferLog};

/// Source of decoded logs for one inclusive block range
///
/// Implemented by [`ChainClient`](crate::providers::ChainClient) over JSON-RPC.
pub trait LogSource: Sync {
    /// ERC20 `Transfer` logs of `token` whose `to` is `recipient`
    fn transfer_logs(
        &self,
        token: Address,
        recipient: Address,
        range: BlockRange,
    ) -> impl Future<Output = AppResult<Vec<TransferLog>>> + Send;

    /// `Staked` logs emitted by `contract`
    fn stake_logs(
        &self,
        contract: Address,
        range: BlockRange,
    ) -> impl Future<Output = AppResult<Vec<StakeLog>>> + Send;
}

/// Everything a completed scan collected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub transfers: Vec<TransferLog>,
    pub stake_events: Vec<StakeLog>,
    /// Successfully scanned chunks, in order
    pub chunks: Vec<BlockRange>,
}

impl ScanOutcome {
    /// All collected logs as one sequence, chunk by chunk (transfers before stakes)
    pub fn events(&self) -> Vec<LogEvent> {
        self.transfers
            .iter()
            .cloned()
            .map(LogEvent::from)
            .chain(self.stake_events.iter().cloned().map(LogEvent::from))
            .collect()
    }
}

/// Mutable cursor state for one scan
#[derive(Debug)]
pub struct ScanState {
    pub current_from: u64,
    pub batch_size: u64,
    pub collected_transfers: Vec<TransferLog>,
    pub collected_stake_events: Vec<StakeLog>,
    chunks: Vec<BlockRange>,
}

impl ScanState {
    fn new(start: u64, batch_size: u64) -> Self {
        Self {
            current_from: start,
            batch_size,
            collected_transfers: Vec::new(),
            collected_stake_events: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Next chunk to query, clipped to `end`
    fn next_chunk(&self, end: u64) -> BlockRange {
        let to = self
            .current_from
            .saturating_add(self.batch_size.saturating_sub(1))
            .min(end);
        BlockRange::new(self.current_from, to)
    }

    fn record(&mut self, chunk: BlockRange, transfers: Vec<TransferLog>, stakes: Vec<StakeLog>) {
        self.collected_transfers.extend(transfers);
        self.collected_stake_events.extend(stakes);
        self.chunks.push(chunk);
    }

    /// Whether blocks remain after `chunk` was recorded; advances the cursor
    fn advance_past(&mut self, chunk: BlockRange, end: u64) -> bool {
        if chunk.to >= end {
            return false;
        }
        self.current_from = chunk.to + 1;
        true
    }

    fn into_outcome(self) -> ScanOutcome {
        ScanOutcome {
            transfers: self.collected_transfers,
            stake_events: self.collected_stake_events,
            chunks: self.chunks,
        }
    }
}

/// Chunked scanner with shrink-on-failure batch sizing
pub struct LogScanner<'a, S> {
    source: &'a S,
    config: ScanConfig,
}

impl<'a, S: LogSource> LogScanner<'a, S> {
    pub fn new(source: &'a S, config: ScanConfig) -> Self {
        Self { source, config }
    }

    /// Scan `range` for transfers of `token` into `contract` and `Staked` events of `contract`
    ///
    /// Every block of the range is covered exactly once. Fails with
    /// `SCAN_INVALID_RANGE` for an inverted range and `SCAN_ABORTED` when the
    /// batch size has to shrink below the configured floor.
    pub async fn scan(
        &self,
        token: Address,
        contract: Address,
        range: BlockRange,
    ) -> AppResult<ScanOutcome> {
        if !range.is_valid() {
            return Err(AppError::invalid_range(range.from, range.to));
        }
        self.config.validate()?;

        info!(
            "🔎 Scanning {} blocks ({}) starting at batch size {}",
            range.width(),
            range,
            self.config.max_batch_blocks
        );

        let mut state = ScanState::new(range.from, self.config.max_batch_blocks);

        loop {
            let chunk = state.next_chunk(range.to);
            debug!("Processing blocks {} (batch size {})", chunk, state.batch_size);

            let result = try_join(
                self.source.transfer_logs(token, contract, chunk),
                self.source.stake_logs(contract, chunk),
            )
            .await;

            match result {
                Ok((transfers, stakes)) => {
                    debug!(
                        "✅ Blocks {}: {} transfers, {} stake events",
                        chunk,
                        transfers.len(),
                        stakes.len()
                    );
                    state.record(chunk, transfers, stakes);

                    if !state.advance_past(chunk, range.to) {
                        break;
                    }
                    if !self.config.chunk_delay.is_zero() {
                        tokio::time::sleep(self.config.chunk_delay).await;
                    }
                }
                Err(e) => {
                    let shrunk = state.batch_size / 2;
                    if shrunk < self.config.min_batch_blocks {
                        return Err(AppError::scan_aborted(
                            chunk,
                            state.batch_size,
                            self.config.min_batch_blocks,
                            e,
                        ));
                    }
                    warn!(
                        "⚠️ Log query for blocks {} failed ({}), shrinking batch {} → {}",
                        chunk, e, state.batch_size, shrunk
                    );
                    state.batch_size = shrunk;
                }
            }
        }

        let outcome = state.into_outcome();
        info!(
            "📦 Scan complete: {} chunks, {} transfers, {} stake events",
            outcome.chunks.len(),
            outcome.transfers.len(),
            outcome.stake_events.len()
        );
        Ok(outcome)
    }
}
