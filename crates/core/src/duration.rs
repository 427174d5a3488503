//! Restricted ISO-8601 duration parsing for reminder fire-offsets.
//!
//! Only three shapes are accepted: `PT<n>H`, `P<n>D`, `P<n>W`, with a
//! positive integer `n`. This is a deliberate departure from a full
//! ISO-8601 duration grammar (no combined designators, no fractional
//! values, no negative durations) — see the design notes on restricted
//! duration parsing.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated reminder fire-offset: hours, days, or weeks before due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FireOffset {
    unit: OffsetUnit,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetUnit {
    Hours,
    Days,
    Weeks,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error(
        "invalid fire offset '{0}': expected PT<n>H, P<n>D, or P<n>W with a positive integer n"
    )]
    InvalidFormat(String),
    #[error("fire offset count must be positive, got 0 in '{0}'")]
    NonPositiveCount(String),
}

impl FireOffset {
    /// Parse a restricted ISO-8601 duration string.
    pub fn parse(raw: &str) -> Result<Self, DurationError> {
        let (unit, digits) = if let Some(rest) = raw.strip_prefix("PT") {
            let digits = rest
                .strip_suffix('H')
                .ok_or_else(|| DurationError::InvalidFormat(raw.to_owned()))?;
            (OffsetUnit::Hours, digits)
        } else if let Some(rest) = raw.strip_prefix('P') {
            if let Some(digits) = rest.strip_suffix('D') {
                (OffsetUnit::Days, digits)
            } else if let Some(digits) = rest.strip_suffix('W') {
                (OffsetUnit::Weeks, digits)
            } else {
                return Err(DurationError::InvalidFormat(raw.to_owned()));
            }
        } else {
            return Err(DurationError::InvalidFormat(raw.to_owned()));
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DurationError::InvalidFormat(raw.to_owned()));
        }
        let count: u32 = digits
            .parse()
            .map_err(|_| DurationError::InvalidFormat(raw.to_owned()))?;
        if count == 0 {
            return Err(DurationError::NonPositiveCount(raw.to_owned()));
        }

        Ok(Self { unit, count })
    }

    /// The offset as a `chrono::Duration`, usable for `due_at - offset`.
    #[must_use]
    pub fn as_chrono_duration(&self) -> Duration {
        match self.unit {
            OffsetUnit::Hours => Duration::hours(i64::from(self.count)),
            OffsetUnit::Days => Duration::days(i64::from(self.count)),
            OffsetUnit::Weeks => Duration::weeks(i64::from(self.count)),
        }
    }
}

impl fmt::Display for FireOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            OffsetUnit::Hours => write!(f, "PT{}H", self.count),
            OffsetUnit::Days => write!(f, "P{}D", self.count),
            OffsetUnit::Weeks => write!(f, "P{}W", self.count),
        }
    }
}

impl TryFrom<String> for FireOffset {
    type Error = DurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FireOffset> for String {
    fn from(value: FireOffset) -> Self {
        value.to_string()
    }
}
