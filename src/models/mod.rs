//! Models Module - Data Structures & Configuration
//!
//! Config, error codes and every type passed between the scanner,
//! the aggregator and the report.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
