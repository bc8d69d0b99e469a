//! Providers Module - Chain Access
//!
//! JSON-RPC transport and the typed chain client built on it.

pub mod chain;
pub mod rpc;

pub use chain::*;
pub use rpc::*;
