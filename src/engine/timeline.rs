//! Timeline Aggregator
//!
//! Re-runs the bucket calculator and ratio deriver for every period on the
//! records falling inside it. Periods share no state, so a period computed
//! inside a batch equals the same period computed alone; large batches are
//! fanned out over the rayon pool and collected back in period order.

use rayon::prelude::*;
use tracing::debug;

use super::{calculate_time_buckets, derive_ratios, EngineSettings};
use crate::types::{DataStatus, OeeRatios, Period, RecordSet, TimelinePoint};

/// Ratios for one period, or `None` when it holds no status records.
pub fn compute_period(
    records: &RecordSet,
    period: &Period,
    settings: &EngineSettings,
) -> Option<OeeRatios> {
    let scoped = records.within(period);
    calculate_time_buckets(
        &scoped.status,
        &scoped.production,
        &scoped.quality,
        period.hours(),
        settings,
    )
    .ok()
    .map(|breakdown| derive_ratios(&breakdown.buckets))
}

/// One point per period, in period order.
pub fn aggregate_timeline(
    records: &RecordSet,
    periods: &[Period],
    settings: &EngineSettings,
) -> Vec<TimelinePoint> {
    let to_point = |period: &Period| {
        let ratios = compute_period(records, period, settings);
        TimelinePoint {
            timestamp: period.start,
            period_end: period.end,
            data_status: if ratios.is_some() {
                DataStatus::Available
            } else {
                DataStatus::Unavailable
            },
            ratios,
        }
    };

    let parallel = periods.len() >= settings.parallel_min_periods;
    debug!(periods = periods.len(), parallel, "Aggregating timeline");

    if parallel {
        periods.par_iter().map(to_point).collect()
    } else {
        periods.iter().map(to_point).collect()
    }
}
