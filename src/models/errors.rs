//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be grepped out of logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CFG_xxx: Configuration errors
//! - RPC_xxx: RPC-related errors
//! - CONTRACT_xxx: Contract read / ABI errors
//! - SCAN_xxx: Historical log scan errors

use std::fmt;

use crate::models::types::BlockRange;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Check if the failed operation may succeed when repeated as-is
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Configuration Errors (1xx)
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Contract address is not 40 hex digits
    ConfigInvalidAddress,

    // ============================================
    // RPC Errors (2xx)
    // ============================================
    /// RPC connection failed
    RpcConnectionFailed,
    /// RPC request timeout
    RpcTimeout,
    /// RPC rate limited (HTTP 429 / -32005)
    RpcRateLimited,
    /// Transient HTTP status from the endpoint (408 / 5xx)
    RpcHttpError,
    /// Endpoint rejected the request outright (other 4xx)
    RpcHttpRejected,
    /// RPC returned error response
    RpcError,
    /// Invalid RPC response
    RpcInvalidResponse,

    // ============================================
    // Contract Errors (3xx)
    // ============================================
    /// No bytecode at the configured address
    ContractNotFound,
    /// eth_call reverted or returned undecodable data
    ContractCallFailed,

    // ============================================
    // Scan Errors (4xx)
    // ============================================
    /// Start block is after end block
    ScanInvalidRange,
    /// Batch size shrank below the floor
    ScanAborted,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigInvalidAddress => "CFG_INVALID_ADDRESS",

            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcRateLimited => "RPC_RATE_LIMITED",
            Self::RpcHttpError => "RPC_HTTP_ERROR",
            Self::RpcHttpRejected => "RPC_HTTP_REJECTED",
            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::ContractNotFound => "CONTRACT_NOT_FOUND",
            Self::ContractCallFailed => "CONTRACT_CALL_FAILED",

            Self::ScanInvalidRange => "SCAN_INVALID_RANGE",
            Self::ScanAborted => "SCAN_ABORTED",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Check if error is retryable at the transport level
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcTimeout | Self::RpcRateLimited | Self::RpcConnectionFailed | Self::RpcHttpError
        )
    }

    /// Check if error belongs to the configuration category
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissingEnv | Self::ConfigInvalidValue | Self::ConfigInvalidAddress
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Missing environment variable
    pub fn missing_env(key: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Required environment variable {} is not set", key),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, format!("{}: {}", key, reason))
    }

    /// Malformed contract address
    pub fn invalid_address(value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidAddress,
            format!("Invalid Ethereum address format: {}", value),
        )
    }

    /// RPC timeout
    pub fn rpc_timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcTimeout, msg)
    }

    /// RPC rate limited
    pub fn rpc_rate_limited() -> Self {
        Self::new(ErrorCode::RpcRateLimited, "Rate limited (HTTP 429)")
    }

    /// Non-success HTTP status; only 408 and 5xx are worth repeating
    pub fn http_status(status: u16) -> Self {
        if status == 429 {
            return Self::rpc_rate_limited();
        }
        let code = if status == 408 || (500..600).contains(&status) {
            ErrorCode::RpcHttpError
        } else {
            ErrorCode::RpcHttpRejected
        };
        Self::new(code, format!("HTTP error: {}", status))
    }

    /// JSON-RPC error object
    pub fn rpc_error(code: i64, message: &str) -> Self {
        Self::new(ErrorCode::RpcError, format!("RPC error: {} (code: {})", message, code))
    }

    /// Response body could not be interpreted
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    /// No bytecode at the address
    pub fn contract_not_found(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ContractNotFound,
            format!("Contract not found: no bytecode at {}", address),
        )
    }

    /// eth_call failed to decode (`function` is the full signature)
    pub fn call_failed(function: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ContractCallFailed,
            format!("{} returned undecodable data: {}", function, reason),
        )
    }

    /// Scan range is inverted
    pub fn invalid_range(from: u64, to: u64) -> Self {
        Self::new(
            ErrorCode::ScanInvalidRange,
            format!("Start block {} is after end block {}", from, to),
        )
    }

    /// Scan gave up: halving `batch_size` after the failed `range` would breach `min_batch`
    pub fn scan_aborted(range: BlockRange, batch_size: u64, min_batch: u64, last: AppError) -> Self {
        Self::with_source(
            ErrorCode::ScanAborted,
            format!(
                "Log scan aborted at blocks {} (batch size {} would shrink to {}, below floor {})",
                range,
                batch_size,
                batch_size / 2,
                min_batch
            ),
            last,
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::rpc_timeout("Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::RpcInvalidResponse, "Failed to parse response", err)
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}
