//! Running clock used to caption each clip.

use super::error::{PipelineError, PipelineResult};
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::fmt;

/// 12-hour clock with an explicit AM/PM marker, e.g. `2024-01-01 10:00:05 AM`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunningTimestamp(NaiveDateTime);

impl RunningTimestamp {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    pub fn parse(text: &str) -> PipelineResult<Self> {
        NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|e| PipelineError::Validation(format!("invalid timestamp {:?}: {}", text, e)))
    }

    /// Returns the clock moved forward by the whole seconds of `seconds`.
    /// Fractions are truncated; negative or non-finite durations do not move it.
    /// Fails when the result is not a representable date.
    pub fn advanced_by(self, seconds: f64) -> PipelineResult<Self> {
        let whole = if seconds.is_finite() && seconds > 0.0 {
            seconds.trunc() as i64
        } else {
            0
        };
        TimeDelta::try_seconds(whole)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
            .ok_or_else(|| {
                PipelineError::Validation(format!("clock {} cannot advance by {} s", self, seconds))
            })
    }
}

impl fmt::Display for RunningTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}
