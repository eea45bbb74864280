//! Compact duration strings such as `14d`, `30m` or `1d12h`.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Error parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("expected a number before '{unit}' in {input:?}")]
    MissingNumber { input: String, unit: char },

    #[error("unknown unit '{unit}' in {input:?} (use s, m, h or d)")]
    UnknownUnit { input: String, unit: char },

    #[error("number without unit at the end of {input:?}")]
    MissingUnit { input: String },

    #[error("duration {input:?} is too large")]
    Overflow { input: String },
}

/// Parses `<n>(s|m|h|d)` segments, summed. Whitespace is ignored.
///
/// # Errors
/// Returns [`DurationParseError`] for empty input, a unit without a number,
/// a trailing number without unit, unknown units, or overflow.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let trimmed: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let overflow = || DurationParseError::Overflow {
        input: input.to_string(),
    };

    let mut total: u64 = 0;
    let mut number: Option<u64> = None;
    for c in trimmed.chars() {
        if let Some(digit) = c.to_digit(10) {
            let n = number.unwrap_or(0);
            number = Some(
                n.checked_mul(10)
                    .and_then(|n| n.checked_add(u64::from(digit)))
                    .ok_or_else(overflow)?,
            );
            continue;
        }

        let scale = match c {
            's' => 1,
            'm' => MINUTE,
            'h' => HOUR,
            'd' => DAY,
            unit => {
                return Err(DurationParseError::UnknownUnit {
                    input: input.to_string(),
                    unit,
                });
            }
        };
        let n = number.take().ok_or_else(|| DurationParseError::MissingNumber {
            input: input.to_string(),
            unit: c,
        })?;
        total = n
            .checked_mul(scale)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(overflow)?;
    }

    if number.is_some() {
        return Err(DurationParseError::MissingUnit {
            input: input.to_string(),
        });
    }

    Ok(Duration::from_secs(total))
}

/// Formats whole seconds back into the compact form, largest units first.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (scale, unit) in [(DAY, 'd'), (HOUR, 'h'), (MINUTE, 'm'), (1, 's')] {
        if secs >= scale {
            let _ = write!(out, "{}{unit}", secs / scale);
            secs %= scale;
        }
    }
    out
}

/// Serde adapter for duration fields.
///
/// # Errors
/// Fails if the value is not a string or does not parse.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}
