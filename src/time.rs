//! Calendar day time frame
use hifitime::{Duration, Epoch, TimeSeries};

use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Processed time frame
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimeRange {
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serdes::iso8601"))]
    pub start: Epoch,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serdes::iso8601"))]
    pub end: Epoch,
}

impl TimeRange {
    /// Builds the [TimeRange] of one UTC calendar day:
    /// from midnight to 23:59:59, both included.
    pub fn calendar_day(year: i32, month: u8, day: u8) -> Result<Self, Error> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(Error::InvalidDate);
        }
        let start = Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0)
            .map_err(|_| Error::InvalidDate)?;
        let end = Epoch::maybe_from_gregorian_utc(year, month, day, 23, 59, 59, 0)
            .map_err(|_| Error::InvalidDate)?;
        Ok(Self { start, end })
    }
    /// Uniform grid over Self, both ends included
    /// (when `end` falls on the grid).
    pub fn grid(&self, step: Duration) -> Vec<Epoch> {
        uniform_grid(self.start, self.end, step)
    }
}

/// Uniform grid over [start, end], `end` included when it falls on the grid.
/// Empty when `step` is not strictly positive or `end` precedes `start`.
pub fn uniform_grid(start: Epoch, end: Epoch, step: Duration) -> Vec<Epoch> {
    if step <= Duration::ZERO || end < start {
        return Vec::new();
    }
    TimeSeries::inclusive(start, end, step).collect()
}

/// Formats `t` as `YYYY-MM-DDTHH:MM:SS`, in UTC.
pub fn iso8601(t: Epoch) -> String {
    let (y, m, d, hh, mm, ss, _) = t.to_gregorian_utc();
    format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}", y, m, d, hh, mm, ss)
}
