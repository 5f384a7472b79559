//! Context-switching cost estimation.
//!
//! Each task incurs an estimated overhead for switching into and out of it.
//! The overhead scales with the task's duration: short tasks cost
//! `min_cost` minutes, long tasks cost `max_cost` minutes, and tasks in
//! between step along a per-minute scale.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Durations at or below this (minutes) incur the minimum cost.
pub const DEFAULT_MIN_DURATION_MINUTES: u64 = 5;

/// Durations at or above this (minutes) incur the maximum cost.
pub const DEFAULT_MAX_DURATION_MINUTES: u64 = 65;

/// Errors raised for invalid switching cost configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwitchingCostError {
    /// The cost range was not in `min-max` form.
    #[error("switching cost must be a range of whole minutes (e.g. \"1-10\"), got {0:?}")]
    InvalidFormat(String),

    /// The minimum cost exceeds the maximum.
    #[error("switching cost minimum ({min}) exceeds maximum ({max})")]
    InvertedRange { min: u64, max: u64 },

    /// The cost range is too wide for the duration range it scales over.
    #[error("switching cost range spans {span} minutes, at most {max_span} allowed")]
    SpanTooWide { span: u64, max_span: u64 },

    /// The duration range is empty or inverted.
    #[error("invalid duration range: {min}-{max} minutes")]
    InvalidDurationRange { min: u64, max: u64 },
}

/// Sliding-scale switching cost model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchingCost {
    min_cost: u64,
    max_cost: u64,
    /// Duration range in seconds.
    min_duration: u64,
    max_duration: u64,
    /// Cost in minutes for each step, `min_cost..=max_cost`.
    scale: Vec<u64>,
    /// Seconds of task duration per step along `scale`.
    duration_step: u64,
}

impl SwitchingCost {
    /// Create a model over an explicit duration range (both in minutes).
    pub fn new(
        min_cost: u64,
        max_cost: u64,
        min_duration: u64,
        max_duration: u64,
    ) -> Result<Self, SwitchingCostError> {
        if min_cost > max_cost {
            return Err(SwitchingCostError::InvertedRange {
                min: min_cost,
                max: max_cost,
            });
        }
        if min_duration >= max_duration {
            return Err(SwitchingCostError::InvalidDurationRange {
                min: min_duration,
                max: max_duration,
            });
        }

        let cost_span = max_cost - min_cost;
        let duration_span = max_duration - min_duration;
        let max_span = duration_span / 2;
        if cost_span > max_span {
            return Err(SwitchingCostError::SpanTooWide {
                span: cost_span,
                max_span,
            });
        }

        let (scale, duration_step) = if cost_span == 0 {
            (vec![min_cost], 0)
        } else {
            let span_secs = duration_span * 60;
            ((min_cost..=max_cost).collect(), span_secs.div_ceil(cost_span))
        };

        Ok(Self {
            min_cost,
            max_cost,
            min_duration: min_duration * 60,
            max_duration: max_duration * 60,
            scale,
            duration_step,
        })
    }

    /// Create a model over the default duration range.
    pub fn with_range(min_cost: u64, max_cost: u64) -> Result<Self, SwitchingCostError> {
        Self::new(
            min_cost,
            max_cost,
            DEFAULT_MIN_DURATION_MINUTES,
            DEFAULT_MAX_DURATION_MINUTES,
        )
    }

    /// A model that never charges anything.
    pub fn none() -> Self {
        Self {
            min_cost: 0,
            max_cost: 0,
            min_duration: DEFAULT_MIN_DURATION_MINUTES * 60,
            max_duration: DEFAULT_MAX_DURATION_MINUTES * 60,
            scale: vec![0],
            duration_step: 0,
        }
    }

    /// Parse a `min-max` range in minutes. A single value `N` means `N-N`.
    pub fn parse(input: &str) -> Result<Self, SwitchingCostError> {
        let invalid = || SwitchingCostError::InvalidFormat(input.to_string());
        let number = |s: &str| s.trim().parse::<u64>().map_err(|_| invalid());

        let (min, max) = match input.trim().split_once('-') {
            Some((min, max)) => (number(min)?, number(max)?),
            None => {
                let value = number(input)?;
                (value, value)
            }
        };

        Self::with_range(min, max)
    }

    pub const fn min_cost(&self) -> u64 {
        self.min_cost
    }

    pub const fn max_cost(&self) -> u64 {
        self.max_cost
    }

    /// Whether the cost is the same for every duration.
    pub const fn is_constant(&self) -> bool {
        self.min_cost == self.max_cost
    }

    /// Switching cost in minutes for a task of `duration` seconds.
    pub fn for_duration(&self, duration: u64) -> u64 {
        if self.is_constant() || duration <= self.min_duration {
            return self.min_cost;
        }
        if duration >= self.max_duration {
            return self.max_cost;
        }

        // Measured from zero duration, so the index can run past the end of
        // the scale near `max_duration`; it is clamped to the last step.
        let index = duration / self.duration_step;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.scale.get(i))
            .copied()
            .unwrap_or(self.max_cost)
    }
}

impl Default for SwitchingCost {
    fn default() -> Self {
        Self::none()
    }
}

impl FromStr for SwitchingCost {
    type Err = SwitchingCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SwitchingCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            write!(f, "{}m", self.min_cost)
        } else {
            write!(f, "{}-{}m", self.min_cost, self.max_cost)
        }
    }
}
