//! Contract interfaces and log decoder
//! Turns raw `eth_getLogs` entries into typed transfer / stake events

use alloy_primitives::{Address, U256};
use alloy_rpc_types::Log;
use alloy_sol_types::{sol, SolEvent};
use tracing::warn;

use crate::models::types::{StakeLog, TransferLog};

sol! {
    /// Staking contract surface read by the analyzer
    interface IStaking {
        function rewardRate() external view returns (uint256);
        function emissionStart() external view returns (uint256);
        function emissionEnd() external view returns (uint256);
        function lastUpdateTime() external view returns (uint256);
        function totalStaked() external view returns (uint256);
        function feesAccrued() external view returns (uint256);
        function basicToken() external view returns (address);

        event Staked(address indexed user, uint256 amount);
    }

    /// ERC20 subset
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);

        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

/// Decoder for the two log kinds the scanner collects
pub struct LogDecoder;

impl LogDecoder {
    /// Decode an ERC20 `Transfer`
    ///
    /// Falls back to reading the raw topic/data words when strict ABI decoding
    /// fails, leaving fields it cannot recover as `None`.
    pub fn decode_transfer(log: &Log) -> TransferLog {
        match IERC20::Transfer::decode_log(&log.inner, true) {
            Ok(event) => TransferLog {
                transaction_hash: log.transaction_hash,
                block_number: log.block_number,
                from: Some(event.data.from),
                value: Some(event.data.value),
            },
            Err(e) => {
                warn!(
                    "⚠️ Failed to decode Transfer log in tx {:?}: {}",
                    log.transaction_hash, e
                );
                TransferLog {
                    transaction_hash: log.transaction_hash,
                    block_number: log.block_number,
                    from: Self::topic_address(log, 1),
                    value: Self::data_word(log, 0),
                }
            }
        }
    }

    /// Decode a `Staked(user, amount)`
    pub fn decode_stake(log: &Log) -> StakeLog {
        match IStaking::Staked::decode_log(&log.inner, true) {
            Ok(event) => StakeLog {
                transaction_hash: log.transaction_hash,
                block_number: log.block_number,
                user: Some(event.data.user),
                amount: Some(event.data.amount),
            },
            Err(e) => {
                warn!(
                    "⚠️ Failed to decode Staked log in tx {:?}: {}",
                    log.transaction_hash, e
                );
                StakeLog {
                    transaction_hash: log.transaction_hash,
                    block_number: log.block_number,
                    user: Self::topic_address(log, 1),
                    amount: Self::data_word(log, 0),
                }
            }
        }
    }

    fn topic_address(log: &Log, index: usize) -> Option<Address> {
        log.inner.data.topics().get(index).map(|word| Address::from_word(*word))
    }

    fn data_word(log: &Log, index: usize) -> Option<U256> {
        let data = &log.inner.data.data;
        let start = index * 32;
        data.get(start..start + 32).map(U256::from_be_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Bytes, LogData};

    const TOKEN: Address = address!("1111111111111111111111111111111111111111");
    const SENDER: Address = address!("2222222222222222222222222222222222222222");
    const STAKING: Address = address!("3333333333333333333333333333333333333333");

    fn rpc_log(emitter: Address, data: LogData) -> Log {
        Log {
            inner: alloy_primitives::Log { address: emitter, data },
            block_number: Some(19_000_000),
            transaction_hash: Some(b256!(
                "00000000000000000000000000000000000000000000000000000000000000aa"
            )),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_transfer() {
        let event = IERC20::Transfer { from: SENDER, to: STAKING, value: U256::from(5_000u64) };
        let log = rpc_log(TOKEN, event.encode_log_data());

        let decoded = LogDecoder::decode_transfer(&log);
        assert_eq!(decoded.from, Some(SENDER));
        assert_eq!(decoded.value, Some(U256::from(5_000u64)));
        assert_eq!(decoded.block_number, Some(19_000_000));
    }

    #[test]
    fn test_decode_stake() {
        let event = IStaking::Staked { user: SENDER, amount: U256::from(42u64) };
        let log = rpc_log(STAKING, event.encode_log_data());

        let decoded = LogDecoder::decode_stake(&log);
        assert_eq!(decoded.user, Some(SENDER));
        assert_eq!(decoded.amount, Some(U256::from(42u64)));
    }

    #[test]
    fn test_truncated_transfer_keeps_sender_and_drops_value() {
        let topics = vec![
            IERC20::Transfer::SIGNATURE_HASH,
            SENDER.into_word(),
            STAKING.into_word(),
        ];
        let log = rpc_log(TOKEN, LogData::new_unchecked(topics, Bytes::from(vec![0u8; 4])));

        let decoded = LogDecoder::decode_transfer(&log);
        assert_eq!(decoded.from, Some(SENDER));
        assert_eq!(decoded.value, None);
        assert!(decoded.transaction_hash.is_some());
    }
}
