//! Time-Bucket Calculator
//!
//! Accrues the duration between each status record and its successor into a
//! per-status total, then folds the totals into the nested bucket hierarchy:
//!
//! - operating = running + idle + error
//! - production = operating + setup
//! - manned = production + maintenance
//! - value operating = running x mean efficiency x (1 - mean defect rate)
//!
//! The last status record accrues nothing: without a successor its end is
//! undefined, so the trailing edge of the window stays unattributed.

use tracing::debug;

use super::{EngineError, EngineSettings};
use crate::types::{
    hours_between, BucketBreakdown, DataAnomaly, ProductionRecord, QualityAdjustment,
    QualityRecord, StatusHours, StatusRecord, TimeBuckets, ValueTimeBasis,
};

/// Tolerance for bucket ordering checks (hours).
const ORDERING_EPSILON: f64 = 1e-9;

/// Sum the hours spent in each status across adjacent record pairs.
///
/// Returns the totals and the number of pairs whose timestamps went
/// backwards. Such pairs accrue nothing.
pub fn accumulate_status_hours(records: &[StatusRecord]) -> (StatusHours, usize) {
    records
        .windows(2)
        .fold((StatusHours::default(), 0), |(mut hours, backward), pair| {
            let duration = hours_between(pair[0].timestamp, pair[1].timestamp);
            if duration < 0.0 {
                return (hours, backward + 1);
            }
            hours.add(pair[0].status, duration);
            (hours, backward)
        })
}

/// Compute the time buckets for one window.
///
/// `total_equipment_time` is the window length in hours, computed by the
/// caller. Empty production or quality inputs fall back to the efficiency
/// assumption and no quality adjustment respectively; an empty status input
/// is reported as [`EngineError::InsufficientStatusData`].
pub fn calculate_time_buckets(
    status: &[StatusRecord],
    production: &[ProductionRecord],
    quality: &[QualityRecord],
    total_equipment_time: f64,
    settings: &EngineSettings,
) -> Result<BucketBreakdown, EngineError> {
    if status.is_empty() {
        return Err(EngineError::InsufficientStatusData);
    }

    let (status_hours, backward_steps) = accumulate_status_hours(status);
    let mut anomalies = Vec::new();
    if backward_steps > 0 {
        anomalies.push(DataAnomaly::UnorderedStatusRecords { backward_steps });
    }

    let operating_time = status_hours.running + status_hours.idle + status_hours.error;
    let production_time = operating_time + status_hours.setup;
    let manned_time = production_time + status_hours.maintenance;

    let value_basis = match mean(production.iter().map(|p| p.efficiency)) {
        Some(mean_efficiency_percent) => {
            if !(0.0..=100.0).contains(&mean_efficiency_percent) {
                anomalies.push(DataAnomaly::EfficiencyOutOfRange { mean_efficiency_percent });
            }
            ValueTimeBasis::MeasuredEfficiency {
                mean_efficiency_percent,
                samples: production.len(),
            }
        }
        None => ValueTimeBasis::AssumedEfficiency {
            efficiency_percent: settings.assumed_efficiency_percent,
        },
    };
    let efficiency_percent = match value_basis {
        ValueTimeBasis::MeasuredEfficiency { mean_efficiency_percent, .. } => mean_efficiency_percent,
        ValueTimeBasis::AssumedEfficiency { efficiency_percent } => efficiency_percent,
    };
    let mut value_operating_time = status_hours.running * (efficiency_percent / 100.0);

    let quality_adjustment = mean(quality.iter().map(|q| q.defect_rate)).map(|mean_defect_rate| {
        if !(0.0..=1.0).contains(&mean_defect_rate) {
            anomalies.push(DataAnomaly::DefectRateOutOfRange { mean_defect_rate });
        }
        QualityAdjustment {
            mean_defect_rate,
            samples: quality.len(),
        }
    });
    if let Some(adjustment) = &quality_adjustment {
        value_operating_time *= 1.0 - adjustment.mean_defect_rate;
    }

    if value_operating_time > operating_time + ORDERING_EPSILON {
        anomalies.push(DataAnomaly::ValueTimeExceedsOperating {
            value_operating_time,
            operating_time,
        });
    }
    if manned_time > total_equipment_time + ORDERING_EPSILON {
        anomalies.push(DataAnomaly::StatusTimeExceedsWindow {
            manned_time,
            total_equipment_time,
        });
    }

    let buckets = TimeBuckets {
        value_operating_time,
        operating_time,
        production_time,
        manned_time,
        total_equipment_time,
    };

    debug!(
        records = status.len(),
        running_h = status_hours.running,
        operating_h = operating_time,
        value_operating_h = value_operating_time,
        anomalies = anomalies.len(),
        "Time buckets computed"
    );

    Ok(BucketBreakdown {
        buckets,
        status_hours,
        value_basis,
        quality: quality_adjustment,
        production_count: production.iter().map(|p| p.interval_count).sum(),
        anomalies,
    })
}

/// Arithmetic mean, `None` for an empty input.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
