//! RPC Client Module - JSON-RPC over HTTP
//!
//! 1. Single configured endpoint (RPC_URL), API key masked in logs
//! 2. Exponential backoff with jitter for rate limits, timeouts and connection drops
//! 3. JSON-RPC error objects are returned immediately, never retried here
//! 4. Gzip compression + User-Agent header
//!
//! Uses constants from utils/constants.rs

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    BASE_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS, RETRY_JITTER_PERCENT, USER_AGENT as USER_AGENT_CONST,
};

/// JSON-RPC client with retry logic
#[derive(Debug)]
pub struct RpcClient {
    /// Endpoint URL (may embed an API key)
    url: String,
    /// HTTP client with custom headers (gzip enabled)
    client: reqwest::Client,
    /// Attempts for retryable failures
    max_retries: u32,
    /// Request id counter
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Self::with_options(&config.rpc_url, config.rpc_timeout, config.rpc_max_retries)
    }

    pub fn with_options(url: &str, timeout: Duration, max_retries: u32) -> AppResult<Self> {
        Ok(Self {
            url: url.to_string(),
            client: Self::build_client(timeout)?,
            max_retries: max_retries.max(1),
            next_id: AtomicU64::new(1),
        })
    }

    /// Build HTTP client with custom headers
    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::with_source(ErrorCode::RpcConnectionFailed, "Failed to build HTTP client", e))
    }

    /// Execute JSON-RPC call with retry logic
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        });

        let mut attempt = 0;
        loop {
            match self.execute_call::<T>(&payload).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_retries => {
                    let delay = retry_delay(attempt);
                    if e.code == ErrorCode::RpcRateLimited {
                        warn!(
                            "⏳ Rate limited on {}, backing off {}ms (attempt {}/{})",
                            method,
                            delay.as_millis(),
                            attempt + 1,
                            self.max_retries
                        );
                    } else {
                        debug!(
                            "⏳ {} failed ({}), retry {}/{} after {}ms",
                            method,
                            e,
                            attempt + 1,
                            self.max_retries,
                            delay.as_millis()
                        );
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute single RPC call
    async fn execute_call<T: DeserializeOwned>(&self, payload: &serde_json::Value) -> AppResult<T> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http_status(status.as_u16()));
        }

        let json: RpcResponse<T> = response.json().await?;
        json.into_result()
    }

    /// Get RPC URL (masked for logging)
    pub fn masked_url(&self) -> String {
        mask_url(&self.url)
    }
}

/// Hide API keys carried in the path (`/v2/<key>`, `/v3/<key>`) or query string
pub fn mask_url(url: &str) -> String {
    let without_query = match url.split_once('?') {
        Some((base, _)) => format!("{}?***HIDDEN***", base),
        None => url.to_string(),
    };
    for marker in ["/v2/", "/v3/"] {
        if let Some((base, _)) = without_query.split_once(marker) {
            return format!("{}{}***HIDDEN***", base, marker);
        }
    }
    without_query
}

/// Backoff for the given zero-based attempt: base * 2^attempt, capped, ±jitter
fn retry_delay(attempt: u32) -> Duration {
    let base_delay = BASE_RETRY_DELAY_MS.saturating_mul(2_u64.saturating_pow(attempt));
    let capped_delay = base_delay.min(MAX_RETRY_DELAY_MS);

    let jitter_range = (capped_delay * RETRY_JITTER_PERCENT) / 100;
    let jitter: i64 = rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
    let final_delay = (capped_delay as i64 + jitter).max(100) as u64;

    Duration::from_millis(final_delay)
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

impl<T> RpcResponse<T> {
    fn into_result(self) -> AppResult<T> {
        if let Some(error) = self.error {
            if error.is_rate_limit() {
                return Err(AppError::new(
                    ErrorCode::RpcRateLimited,
                    format!("RPC error: {} (code: {})", error.message, error.code),
                ));
            }
            return Err(AppError::rpc_error(error.code, &error.message));
        }
        self.result.ok_or_else(|| AppError::invalid_response("No result in response"))
    }
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Check if this is a rate limit error (HTTP 429 equivalent or code -32005 without a range hint)
    pub fn is_rate_limit(&self) -> bool {
        let message = self.message.to_lowercase();
        message.contains("rate limit")
            || message.contains("too many requests")
            || (self.code == -32005 && !message.contains("range") && !message.contains("results"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_url_hides_keys() {
        assert_eq!(
            mask_url("https://eth-mainnet.g.alchemy.com/v2/abcdef"),
            "https://eth-mainnet.g.alchemy.com/v2/***HIDDEN***"
        );
        assert_eq!(
            mask_url("https://mainnet.infura.io/v3/123?foo=bar"),
            "https://mainnet.infura.io/v3/***HIDDEN***"
        );
        assert_eq!(mask_url("http://localhost:8545"), "http://localhost:8545");
    }

    #[test]
    fn test_retry_delay_bounds() {
        for attempt in 0..10 {
            let delay = retry_delay(attempt).as_millis() as u64;
            let base = (BASE_RETRY_DELAY_MS << attempt.min(20)).min(MAX_RETRY_DELAY_MS);
            let slack = base * RETRY_JITTER_PERCENT / 100;
            assert!(delay >= base - slack && delay <= base + slack, "attempt {attempt}: {delay}ms");
        }
    }

    #[test]
    fn test_rpc_error_classification() {
        let rate_limit = RpcError { code: -32005, message: "Rate limit exceeded".to_string() };
        assert!(rate_limit.is_rate_limit());

        let too_many_results = RpcError {
            code: -32005,
            message: "query returned more than 10000 results".to_string(),
        };
        assert!(!too_many_results.is_rate_limit());

        let range = RpcError { code: -32600, message: "block range too large".to_string() };
        assert!(!range.is_rate_limit());
    }

    #[test]
    fn test_response_into_result() {
        let ok: RpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), "0x10");

        let err: RpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid params"}}"#,
        )
        .unwrap();
        let err = err.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::RpcError);
        assert!(!err.is_retryable());

        let limited: RpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":429,"message":"Too Many Requests"}}"#,
        )
        .unwrap();
        assert!(limited.into_result().unwrap_err().is_retryable());
    }
}
