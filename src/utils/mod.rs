//! Utils Module - Helper Functions & Shared Utilities

pub mod constants;
pub mod decoder;
pub mod format;

pub use constants::*;
pub use decoder::*;
pub use format::*;
