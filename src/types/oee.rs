//! Derived OEE results: time buckets, ratios, stops, waterfall and timeline points

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::records::{MachineStatus, Period};

// ============================================================================
// Time Buckets
// ============================================================================

/// Nested time buckets in hours.
///
/// For well-formed input `0 <= value_operating <= operating <= production
/// <= manned <= total_equipment` holds. Violations are reported through
/// [`DataAnomaly`] rather than clamped.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeBuckets {
    pub value_operating_time: f64,
    pub operating_time: f64,
    pub production_time: f64,
    pub manned_time: f64,
    pub total_equipment_time: f64,
}

/// Hours accrued per machine status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusHours {
    pub running: f64,
    pub setup: f64,
    pub maintenance: f64,
    pub stopped: f64,
    pub idle: f64,
    pub error: f64,
    pub unknown: f64,
}

impl StatusHours {
    pub fn add(&mut self, status: MachineStatus, hours: f64) {
        let slot = match status {
            MachineStatus::Running => &mut self.running,
            MachineStatus::Setup => &mut self.setup,
            MachineStatus::Maintenance => &mut self.maintenance,
            MachineStatus::Stopped => &mut self.stopped,
            MachineStatus::Idle => &mut self.idle,
            MachineStatus::Error => &mut self.error,
            MachineStatus::Unknown => &mut self.unknown,
        };
        *slot += hours;
    }
}

/// How value-operating time was derived from running time.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValueTimeBasis {
    /// Mean efficiency of the supplied production records
    #[serde(rename_all = "camelCase")]
    MeasuredEfficiency {
        mean_efficiency_percent: f64,
        samples: usize,
    },
    /// No production records: configured efficiency assumption applied
    #[serde(rename_all = "camelCase")]
    AssumedEfficiency { efficiency_percent: f64 },
}

/// Quality factor applied to value-operating time.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QualityAdjustment {
    pub mean_defect_rate: f64,
    pub samples: usize,
}

/// Input irregularities surfaced to callers instead of being masked.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataAnomaly {
    #[serde(rename_all = "camelCase")]
    EfficiencyOutOfRange { mean_efficiency_percent: f64 },
    #[serde(rename_all = "camelCase")]
    DefectRateOutOfRange { mean_defect_rate: f64 },
    /// Ratios above 100% follow from this
    #[serde(rename_all = "camelCase")]
    ValueTimeExceedsOperating {
        value_operating_time: f64,
        operating_time: f64,
    },
    #[serde(rename_all = "camelCase")]
    StatusTimeExceedsWindow {
        manned_time: f64,
        total_equipment_time: f64,
    },
    /// Status timestamps went backwards; the negative gaps were not accrued
    #[serde(rename_all = "camelCase")]
    UnorderedStatusRecords { backward_steps: usize },
}

/// Output of the time-bucket calculator.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketBreakdown {
    pub buckets: TimeBuckets,
    pub status_hours: StatusHours,
    pub value_basis: ValueTimeBasis,
    pub quality: Option<QualityAdjustment>,
    /// Sum of production interval counts
    pub production_count: f64,
    pub anomalies: Vec<DataAnomaly>,
}

// ============================================================================
// Ratios & Metrics
// ============================================================================

/// The four OEE ratios, in percent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OeeRatios {
    pub oee1: f64,
    pub oee2: f64,
    pub oee3: f64,
    pub tcu: f64,
}

/// Full metrics for one period.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OeeMetrics {
    pub period: Period,
    #[serde(flatten)]
    pub breakdown: BucketBreakdown,
    #[serde(flatten)]
    pub ratios: OeeRatios,
}

/// Whether metrics could be computed from real status data.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DataStatus {
    Available,
    Unavailable,
}

// ============================================================================
// Stops
// ============================================================================

/// Loss category of a stop.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StopCategory {
    LossDuringOperation,
    BatchSpecificNonOperation,
    NonProductionActivities,
    Unknown,
}

impl StopCategory {
    pub fn for_status(status: MachineStatus) -> Self {
        match status {
            MachineStatus::Error | MachineStatus::Idle => Self::LossDuringOperation,
            MachineStatus::Setup | MachineStatus::Maintenance => Self::BatchSpecificNonOperation,
            MachineStatus::Stopped => Self::NonProductionActivities,
            MachineStatus::Running | MachineStatus::Unknown => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LossDuringOperation => "Loss During Operation",
            Self::BatchSpecificNonOperation => "Batch Specific Non-Operation",
            Self::NonProductionActivities => "Non-Production Activities",
            Self::Unknown => "Unknown",
        }
    }
}

/// A maximal run of one non-running status.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StopEvent {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: f64,
    pub status: MachineStatus,
    pub category: StopCategory,
    pub reason: &'static str,
}

/// Stops split by loss category, each list chronological.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StopsByCategory {
    pub loss_during_operation: Vec<StopEvent>,
    pub batch_specific: Vec<StopEvent>,
    pub non_production: Vec<StopEvent>,
    pub unknown: Vec<StopEvent>,
}

/// Aggregate for one stop reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StopCauseSummary {
    pub reason: &'static str,
    pub category: StopCategory,
    /// Display name of `category`
    pub category_label: &'static str,
    pub total_hours: f64,
    pub occurrences: usize,
    pub share_percent: f64,
}

// ============================================================================
// Waterfall
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    /// Absolute bucket level
    Level,
    /// Signed (negative) loss between two levels
    Loss,
}

/// One bar of the bridge chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallStep {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: StepKind,
    pub value: f64,
    /// Running level after this step
    pub cumulative: f64,
}

// ============================================================================
// Timeline
// ============================================================================

/// Sub-window granularity for timelines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

impl Interval {
    pub fn duration(self) -> Duration {
        match self {
            Self::Hourly => Duration::hours(1),
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::weeks(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(format!(
                "unknown interval '{other}' (expected hourly, daily or weekly)"
            )),
        }
    }
}

/// One timeline sample. Ratios are absent when the period had no status data.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub data_status: DataStatus,
    #[serde(flatten)]
    pub ratios: Option<OeeRatios>,
}
