//! Display helpers for token amounts, durations, timestamps and terminal links

use alloy_primitives::{utils::format_units, U256};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

use crate::utils::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

/// Format a raw token amount in whole-token units, trimming trailing zeros
///
/// Falls back to the raw integer when `decimals` is outside what the unit
/// conversion accepts.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    match format_units(amount, decimals) {
        Ok(formatted) if formatted.contains('.') => {
            formatted.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        Ok(formatted) => formatted,
        Err(_) => amount.to_string(),
    }
}

/// Whole days and remaining whole hours of a span in seconds
pub fn split_days_hours(seconds: u64) -> (u64, u64) {
    (seconds / SECONDS_PER_DAY, (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR)
}

/// Unix seconds rendered in the local timezone
pub fn format_timestamp(secs: u64) -> String {
    format_timestamp_in(secs, &Local)
}

pub fn format_timestamp_in<Tz>(secs: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("@{}", secs))
}

/// OSC 8 terminal hyperlink, blue and underlined
pub fn clickable_link(text: &str, url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\\x1b[4;34m{text}\x1b[0m\x1b]8;;\x1b\\")
}
