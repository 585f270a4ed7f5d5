use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::floor_to_second;

/// A closed time interval `[start, end]` at whole-second resolution.
///
/// Both endpoints are included. `start <= end` always holds: the constructor
/// rejects reversed input and deserialization goes through the same check, so
/// a `TimeRange` in hand is a valid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeRangeRepr")]
pub struct TimeRange {
    #[serde(with = "chrono::serde::ts_seconds")]
    start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    end: DateTime<Utc>,
}

/// Raw serialized form, validated into [`TimeRange`] on load.
#[derive(Deserialize)]
struct TimeRangeRepr {
    #[serde(with = "chrono::serde::ts_seconds")]
    start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    end: DateTime<Utc>,
}

impl TryFrom<TimeRangeRepr> for TimeRange {
    type Error = String;

    fn try_from(repr: TimeRangeRepr) -> Result<Self, Self::Error> {
        TimeRange::new(repr.start, repr.end).ok_or_else(|| {
            format!(
                "invalid time range: start {} is after end {}",
                repr.start.timestamp(),
                repr.end.timestamp()
            )
        })
    }
}

impl TimeRange {
    /// Build a range, flooring both endpoints to whole seconds.
    ///
    /// Returns `None` when `start > end` after flooring.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        let start = floor_to_second(start);
        let end = floor_to_second(end);
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// The single-second range `[time, time]`.
    pub fn single(time: DateTime<Utc>) -> Self {
        let time = floor_to_second(time);
        Self {
            start: time,
            end: time,
        }
    }

    /// Internal constructor for endpoints already known to be ordered.
    pub(crate) fn from_parts(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Inclusive lower endpoint.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive upper endpoint.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Number of whole seconds spanned, counting both endpoints.
    pub fn seconds(&self) -> i64 {
        self.end.timestamp() - self.start.timestamp() + 1
    }

    /// Is `time` inside the range (endpoints included)?
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.end
    }

    /// Is `other` entirely inside this range?
    pub fn contains_range(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Do the two ranges share at least one second?
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Do the two ranges overlap or sit exactly one second apart?
    ///
    /// Touching ranges merge into one: in the integer-second domain there is
    /// no gap between `[a, t]` and `[t+1, b]`.
    pub fn touches(&self, other: &TimeRange) -> bool {
        self.start.timestamp() <= other.end.timestamp() + 1
            && other.start.timestamp() <= self.end.timestamp() + 1
    }

    /// The overlapping part of two ranges, if any.
    pub fn intersection(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end {
            return None;
        }
        Some(TimeRange::from_parts(start, end))
    }

    /// Smallest range containing both inputs.
    ///
    /// Only meaningful when the inputs touch; otherwise the result also
    /// spans the gap between them.
    pub fn merge(&self, other: &TimeRange) -> TimeRange {
        TimeRange::from_parts(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} .. {}]",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// The second immediately after `time`.
pub(crate) fn second_after(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp() + 1, 0).unwrap_or(time)
}

/// The second immediately before `time`.
pub(crate) fn second_before(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp() - 1, 0).unwrap_or(time)
}
