//! Core Module - Scanning & Analysis
//!
//! Adaptive log scan, transfer aggregation and the staking analyzer that
//! ties them to contract reads.

pub mod aggregator;
pub mod scanner;
pub mod staking;

pub use aggregator::*;
pub use scanner::*;
pub use staking::*;
