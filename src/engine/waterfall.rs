//! Waterfall Builder
//!
//! Bridge chart from total equipment time down to value-operating time.
//! Levels alternate with the (negative) loss separating them, so the running
//! level after each loss equals the next level.

use crate::types::{StepKind, TimeBuckets, WaterfallStep};

/// Build the nine bridge steps for a bucket set.
pub fn build_waterfall(buckets: &TimeBuckets) -> Vec<WaterfallStep> {
    let b = buckets;
    let plan: [(&'static str, &'static str, StepKind, f64); 9] = [
        ("total", "Total Equipment Time", StepKind::Level, b.total_equipment_time),
        ("nonProduction", "Non-Production", StepKind::Loss, -(b.total_equipment_time - b.manned_time)),
        ("manned", "Manned Time", StepKind::Level, b.manned_time),
        ("batchSpecific", "Batch Specific", StepKind::Loss, -(b.manned_time - b.production_time)),
        ("production", "Production Time", StepKind::Level, b.production_time),
        ("lossDuringOperation", "Loss During Operation", StepKind::Loss, -(b.production_time - b.operating_time)),
        ("operating", "Operating Time", StepKind::Level, b.operating_time),
        ("operatingLoss", "Operating Loss", StepKind::Loss, -(b.operating_time - b.value_operating_time)),
        ("valueOperating", "Valued Operating Time", StepKind::Level, b.value_operating_time),
    ];

    let mut level = 0.0;
    plan.into_iter()
        .map(|(key, name, kind, value)| {
            level = match kind {
                StepKind::Level => value,
                StepKind::Loss => level + value,
            };
            WaterfallStep {
                key,
                name,
                kind,
                value,
                cumulative: level,
            }
        })
        .collect()
}

/// Opening level plus every signed loss, in emitted order.
///
/// For a waterfall built from consistent buckets this lands on
/// value-operating time.
pub fn bridge_total(steps: &[WaterfallStep]) -> f64 {
    let opening = steps
        .iter()
        .find(|s| s.kind == StepKind::Level)
        .map_or(0.0, |s| s.value);
    let losses: f64 = steps
        .iter()
        .filter(|s| s.kind == StepKind::Loss)
        .map(|s| s.value)
        .sum();
    opening + losses
}
