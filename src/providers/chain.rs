//! Chain Client - typed contract reads, log queries and block metadata
//!
//! Wraps [`RpcClient`] and speaks in alloy types: calls are `sol!` generated,
//! logs come back decoded as [`TransferLog`] / [`StakeLog`].

use alloy_primitives::{Address, Bytes, U64};
use alloy_rpc_types::{Filter, Log};
use alloy_sol_types::{SolCall, SolEvent};
use serde::Deserialize;
use tracing::debug;

use crate::core::scanner::LogSource;
use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{BlockRange, StakeLog, TransferLog};
use crate::providers::rpc::RpcClient;
use crate::utils::decoder::{IERC20, IStaking, LogDecoder};

/// Latest block header fields the report needs
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BlockHeader {
    pub number: U64,
    pub timestamp: U64,
}

/// Chain client bound to one RPC endpoint
#[derive(Debug)]
pub struct ChainClient {
    rpc: RpcClient,
}

impl ChainClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Ok(Self { rpc: RpcClient::new(config)? })
    }

    pub fn masked_url(&self) -> String {
        self.rpc.masked_url()
    }

    /// eth_call a view function and decode its return values
    pub async fn read<C: SolCall>(&self, to: Address, call: C) -> AppResult<C::Return> {
        let data = Bytes::from(call.abi_encode());
        let params = serde_json::json!([{ "to": to, "data": data }, "latest"]);
        let raw: Bytes = self.rpc.call("eth_call", params).await?;

        C::abi_decode_returns(&raw, true).map_err(|e| AppError::call_failed(C::SIGNATURE, e))
    }

    /// Current chain head
    pub async fn block_number(&self) -> AppResult<u64> {
        let number: U64 = self.rpc.call("eth_blockNumber", serde_json::json!([])).await?;
        Ok(number.to::<u64>())
    }

    /// Latest block header (number + timestamp)
    pub async fn latest_block(&self) -> AppResult<BlockHeader> {
        self.rpc
            .call("eth_getBlockByNumber", serde_json::json!(["latest", false]))
            .await
    }

    /// Deployed bytecode at `address` (empty when nothing is deployed)
    pub async fn bytecode(&self, address: Address) -> AppResult<Bytes> {
        self.rpc
            .call("eth_getCode", serde_json::json!([address, "latest"]))
            .await
    }

    /// Raw eth_getLogs
    pub async fn logs(&self, filter: &Filter) -> AppResult<Vec<Log>> {
        self.rpc.call("eth_getLogs", serde_json::json!([filter])).await
    }

    /// `Transfer` logs of `token` whose indexed `to` (topic2) is `recipient`
    pub fn transfer_filter(token: Address, recipient: Address, range: BlockRange) -> Filter {
        Filter::new()
            .address(token)
            .event_signature(IERC20::Transfer::SIGNATURE_HASH)
            .topic2(recipient.into_word())
            .from_block(range.from)
            .to_block(range.to)
    }

    /// `Staked` logs emitted by `contract`, any user
    pub fn stake_filter(contract: Address, range: BlockRange) -> Filter {
        Filter::new()
            .address(contract)
            .event_signature(IStaking::Staked::SIGNATURE_HASH)
            .from_block(range.from)
            .to_block(range.to)
    }

    // ============================================
    // Staking / token convenience reads
    // ============================================

    pub async fn staking_token(&self, staking: Address) -> AppResult<Address> {
        Ok(self.read(staking, IStaking::basicTokenCall {}).await?._0)
    }

    pub async fn token_decimals(&self, token: Address) -> AppResult<u8> {
        Ok(self.read(token, IERC20::decimalsCall {}).await?._0)
    }
}

impl LogSource for ChainClient {
    async fn transfer_logs(
        &self,
        token: Address,
        recipient: Address,
        range: BlockRange,
    ) -> AppResult<Vec<TransferLog>> {
        let filter = Self::transfer_filter(token, recipient, range);
        let logs = self.logs(&filter).await?;
        debug!("📥 {} Transfer logs in {}", logs.len(), range);
        Ok(logs.iter().map(LogDecoder::decode_transfer).collect())
    }

    async fn stake_logs(&self, contract: Address, range: BlockRange) -> AppResult<Vec<StakeLog>> {
        let filter = Self::stake_filter(contract, range);
        let logs = self.logs(&filter).await?;
        debug!("📥 {} Staked logs in {}", logs.len(), range);
        Ok(logs.iter().map(LogDecoder::decode_stake).collect())
    }
}
