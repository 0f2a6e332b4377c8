//! Period Partitioner
//!
//! Splits `[start, end)` into contiguous sub-windows of a fixed length. The
//! last period is clipped to `end` and may be shorter than the interval.

use chrono::{DateTime, Utc};

use crate::types::{Interval, Period};

/// Partition `[start, end)` at the given granularity.
///
/// Returns an empty list when `start >= end`.
pub fn partition(start: DateTime<Utc>, end: DateTime<Utc>, interval: Interval) -> Vec<Period> {
    let step = interval.duration();
    std::iter::successors((start < end).then_some(start), |&current| {
        let next = current + step;
        (next < end).then_some(next)
    })
    .map(|current| Period::new(current, (current + step).min(end)))
    .collect()
}

/// Number of periods [`partition`] would produce, without allocating them.
pub fn count_periods(start: DateTime<Utc>, end: DateTime<Utc>, interval: Interval) -> usize {
    if start >= end {
        return 0;
    }
    let span = (end - start).num_milliseconds();
    let step = interval.duration().num_milliseconds();
    let full = span / step;
    let count = if span % step == 0 { full } else { full + 1 };
    usize::try_from(count).unwrap_or(usize::MAX)
}
