//! Conversions between raw seconds and the textual duration forms used in
//! journals.
//!
//! Three representations are handled:
//! - clock durations recorded by logbook timers (`H:MM:SS`)
//! - free-form manual durations from `time::` properties (`1h 30m`)
//! - rounded, human-readable output (`1h 5m`)

use thiserror::Error;

/// Rounding interval for reported durations (5 minutes).
pub const ROUND_INTERVAL_SECS: u64 = 5 * 60;

/// Seconds into the next interval that still round down.
const ROUND_DOWN_THRESHOLD_SECS: u64 = 90;

/// Rendering used when every component of a duration is zero.
pub const ZERO_DURATION: &str = "0m";

/// Errors raised while decoding a duration string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// The input contained no duration tokens at all.
    #[error("duration cannot be empty")]
    Empty,

    /// A clock duration was not in `H:M:S` form.
    #[error("invalid clock duration: {0:?}")]
    InvalidClock(String),

    /// A free-form token did not end in `h` or `m`, or had no number.
    #[error("invalid duration token: {0:?}")]
    InvalidToken(String),
}

/// Parse a clock duration in `H:M:S` form into seconds.
///
/// No range checks are applied to the components: `0:75:00` is 75 minutes.
pub fn parse_clock_duration(input: &str) -> Result<u64, DurationError> {
    let invalid = || DurationError::InvalidClock(input.to_string());

    let mut parts = input.trim().split(':');
    let mut next = || -> Result<u64, DurationError> {
        parts
            .next()
            .and_then(|p| p.parse::<u64>().ok())
            .ok_or_else(invalid)
    };

    let hours = next()?;
    let minutes = next()?;
    let seconds = next()?;

    if parts.next().is_some() {
        return Err(invalid());
    }

    hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Parse a free-form duration such as `1h 30m` into seconds.
///
/// An `h` token sets the hours (a later one replaces an earlier one), while
/// `m` tokens accumulate.
pub fn parse_free_duration(input: &str) -> Result<u64, DurationError> {
    // Both held in seconds.
    let mut hours = 0u64;
    let mut minutes = 0u64;
    let mut seen_any = false;

    for token in input.split_whitespace() {
        seen_any = true;
        let invalid = || DurationError::InvalidToken(token.to_string());

        if let Some(value) = token.strip_suffix('h') {
            hours = value
                .parse::<u64>()
                .ok()
                .and_then(|h| h.checked_mul(3600))
                .ok_or_else(invalid)?;
        } else if let Some(value) = token.strip_suffix('m') {
            minutes = value
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .and_then(|m| minutes.checked_add(m))
                .ok_or_else(invalid)?;
        } else {
            return Err(invalid());
        }
    }

    if !seen_any {
        return Err(DurationError::Empty);
    }

    hours
        .checked_add(minutes)
        .ok_or_else(|| DurationError::InvalidToken(input.trim().to_string()))
}

/// Round a duration to a 5-minute interval.
///
/// Zero stays zero and anything shorter than one interval becomes exactly one
/// interval. Otherwise a remainder of up to 90 seconds rounds down and
/// anything longer rounds up.
pub const fn round_duration(total_seconds: u64) -> u64 {
    if total_seconds == 0 {
        return 0;
    }
    if total_seconds < ROUND_INTERVAL_SECS {
        return ROUND_INTERVAL_SECS;
    }

    let base = total_seconds / ROUND_INTERVAL_SECS;
    let remainder = total_seconds % ROUND_INTERVAL_SECS;

    let rounded = base * ROUND_INTERVAL_SECS;
    if remainder > ROUND_DOWN_THRESHOLD_SECS {
        rounded.saturating_add(ROUND_INTERVAL_SECS)
    } else {
        rounded
    }
}

/// Render seconds as `{h}h {m}m {s}s`, omitting zero components.
///
/// A zero duration renders as [`ZERO_DURATION`].
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let parts: Vec<String> = [(hours, 'h'), (minutes, 'm'), (seconds, 's')]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        ZERO_DURATION.to_string()
    } else {
        parts.join(" ")
    }
}
