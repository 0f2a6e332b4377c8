//! Ratio Deriver
//!
//! OEE1, OEE2, OEE3 and TCU divide value-operating time by progressively
//! larger denominators. A zero denominator yields exactly `0.0`: no measured
//! time is reported as zero effectiveness, never `NaN` or infinity.

use crate::types::{OeeRatios, TimeBuckets};

/// Derive the four ratios (percent) from a bucket set.
///
/// Values above 100 are passed through unchanged; they only arise from
/// out-of-range inputs, which the bucket calculator reports as anomalies.
pub fn derive_ratios(buckets: &TimeBuckets) -> OeeRatios {
    let vot = buckets.value_operating_time;
    OeeRatios {
        oee1: percent_of(vot, buckets.operating_time),
        oee2: percent_of(vot, buckets.production_time),
        oee3: percent_of(vot, buckets.manned_time),
        tcu: percent_of(vot, buckets.total_equipment_time),
    }
}

fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}
