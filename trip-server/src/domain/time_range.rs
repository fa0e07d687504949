//! Service validity time range.
//!
//! The routing data only covers a bounded window (the loaded GTFS
//! feeds). Paging beyond it can never find a route, so the range is
//! checked before every paging request and violations are terminal.

use super::DomainError;

/// Seconds in a day.
const DAY_SECONDS: i64 = 24 * 60 * 60;

/// The unix-second window the routing data is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeRange {
    /// Inclusive start, unix seconds
    pub start: i64,
    /// Exclusive end, unix seconds
    pub end: i64,
}

impl ServiceTimeRange {
    /// Construct a range, rejecting inverted bounds.
    pub fn new(start: i64, end: i64) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvertedTimeRange);
        }
        Ok(Self { start, end })
    }

    /// The effective range used for paging decisions: the fetched end
    /// capped to `now + horizon_days` (searching months ahead gives
    /// poor results even when data nominally exists), the start left
    /// as fetched. A cap below the start collapses the range to empty
    /// rather than inverting it.
    pub fn clamped(&self, now: i64, horizon_days: i64) -> ServiceTimeRange {
        let cap = now + horizon_days * DAY_SECONDS;
        let end = self.end.min(cap).max(self.start);
        ServiceTimeRange {
            start: self.start,
            end,
        }
    }

    /// Fallback range when the endpoint's range cannot be fetched:
    /// `horizon_days` ahead of now.
    pub fn fallback(now: i64, horizon_days: i64) -> ServiceTimeRange {
        ServiceTimeRange {
            start: now,
            end: now + horizon_days * DAY_SECONDS,
        }
    }

    /// True when a unix-millisecond instant falls inside the range.
    pub fn contains_ms(&self, instant_ms: i64) -> bool {
        let start_ms = self.start * 1000;
        let end_ms = self.end * 1000;
        instant_ms >= start_ms && instant_ms < end_ms
    }
}
