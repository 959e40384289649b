// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Timeout and poll-interval values as they appear in resource configuration.

use crate::constants::wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, UNBOUNDED_TIMEOUT};
use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A duration written either as whole seconds or as a string like `"2h45m"`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(i64),
    Text(String),
}

impl DurationValue {
    pub fn default_timeout() -> Self {
        DurationValue::Text(DEFAULT_TIMEOUT.to_string())
    }

    pub fn default_poll_interval() -> Self {
        DurationValue::Text(DEFAULT_POLL_INTERVAL.to_string())
    }

    /// Split into sign and magnitude
    fn to_signed(&self) -> Result<(bool, Duration)> {
        match self {
            DurationValue::Seconds(secs) => {
                Ok((*secs < 0, Duration::from_secs(secs.unsigned_abs())))
            }
            DurationValue::Text(text) => parse_signed(text),
        }
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationValue::Seconds(secs) => write!(f, "{}s", secs),
            DurationValue::Text(text) => f.write_str(text),
        }
    }
}

/// How long a wait may block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeout {
    /// Zero: evaluate the condition once and never sleep
    CheckOnce,
    Within(Duration),
    /// Negative: wait for a week
    Unbounded,
}

impl Timeout {
    pub fn parse(value: &DurationValue) -> Result<Self> {
        let (negative, duration) = value.to_signed()?;
        Ok(if duration.is_zero() {
            Timeout::CheckOnce
        } else if negative {
            Timeout::Unbounded
        } else {
            Timeout::Within(duration)
        })
    }

    /// The effective time budget of a wait
    pub fn budget(&self) -> Duration {
        match self {
            Timeout::CheckOnce => Duration::ZERO,
            Timeout::Within(d) => *d,
            Timeout::Unbounded => UNBOUNDED_TIMEOUT,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Within(Duration::from_secs(30))
    }
}

/// Parse a poll interval, which must be strictly positive
pub fn parse_poll_interval(value: &DurationValue) -> Result<Duration> {
    let (negative, duration) = value.to_signed()?;
    if negative || duration.is_zero() {
        return Err(ProviderError::InvalidDuration {
            value: value.to_string(),
            reason: "poll interval must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

/// Nanoseconds per accepted unit suffix
const UNITS: [(&str, u128); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

/// Largest magnitude accepted, a signed 64-bit count of nanoseconds
const MAX_NANOS: u128 = i64::MAX as u128;

/// Parse a signed duration string such as `"-1h"`, `"1.5s"` or `"2h45m"`
pub fn parse_signed(text: &str) -> Result<(bool, Duration)> {
    let invalid = |reason: String| ProviderError::InvalidDuration {
        value: text.to_string(),
        reason,
    };

    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    if magnitude.is_empty() {
        return Err(invalid("empty duration".to_string()));
    }
    if magnitude == "0" {
        return Ok((negative, Duration::ZERO));
    }

    let duration = parse_magnitude(magnitude).map_err(invalid)?;
    Ok((negative, duration))
}

/// Sum a sequence of `<decimal><unit>` terms
fn parse_magnitude(magnitude: &str) -> std::result::Result<Duration, String> {
    let is_numeric = |c: char| c.is_ascii_digit() || c == '.';
    let out_of_range = || "duration out of range".to_string();

    let mut rest = magnitude;
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (number, tail) = rest.split_at(rest.find(|c: char| !is_numeric(c)).unwrap_or(rest.len()));
        let (unit, tail) = tail.split_at(tail.find(is_numeric).unwrap_or(tail.len()));

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(format!("expected a number before '{}'", unit));
        }
        if unit.is_empty() {
            return Err(format!("missing unit after '{}'", number));
        }
        let scale = UNITS
            .iter()
            .find(|(suffix, _)| *suffix == unit)
            .map(|(_, nanos)| *nanos)
            .ok_or_else(|| format!("unknown unit '{}', expected one of ns, us, µs, ms, s, m, h", unit))?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };
        let mut term = whole.checked_mul(scale).ok_or_else(out_of_range)?;

        // digits past nanosecond precision are dropped
        let digits = &fraction[..fraction.len().min(18)];
        if !digits.is_empty() {
            let value: u128 = digits.parse().map_err(|_| out_of_range())?;
            term += value * scale / 10u128.pow(digits.len() as u32);
        }

        total = total
            .checked_add(term)
            .filter(|nanos| *nanos <= MAX_NANOS)
            .ok_or_else(out_of_range)?;
        rest = tail;
    }

    Ok(Duration::from_nanos(total as u64))
}
