//! Raw device records: machine status, production and quality samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::EngineError;

// ============================================================================
// Machine Status
// ============================================================================

/// Operating state reported by a device.
///
/// A status is effective from its record's timestamp until the next record.
/// Labels the engine does not recognise deserialize to [`MachineStatus::Unknown`]
/// so they stay visible in stop segmentation instead of being dropped.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Running,
    Setup,
    Maintenance,
    Stopped,
    Idle,
    Error,
    Unknown,
}

impl MachineStatus {
    /// Parse a status label case-insensitively. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "setup" => Self::Setup,
            "maintenance" => Self::Maintenance,
            "stopped" => Self::Stopped,
            "idle" => Self::Idle,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    /// Human-readable stop reason shown in stop-cause breakdowns.
    pub fn stop_reason(self) -> &'static str {
        match self {
            Self::Error => "Equipment Failure",
            Self::Idle => "Idle Time",
            Self::Setup => "Setup/Changeover",
            Self::Maintenance => "Planned Maintenance",
            Self::Stopped => "Planned Downtime",
            Self::Running | Self::Unknown => "Other",
        }
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Setup => "setup",
            Self::Maintenance => "maintenance",
            Self::Stopped => "stopped",
            Self::Idle => "idle",
            Self::Error => "error",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for MachineStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_label(&raw))
    }
}

// ============================================================================
// Records
// ============================================================================

/// Anything carrying a sample timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Device state change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub timestamp: DateTime<Utc>,
    pub status: MachineStatus,
}

/// Production counter sample. Only the mean efficiency feeds the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default, alias = "interval_count")]
    pub interval_count: f64,
    /// Interval efficiency in percent (0-100)
    #[serde(default, alias = "intervalEfficiency")]
    pub efficiency: f64,
}

/// Quality inspection sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QualityRecord {
    pub timestamp: DateTime<Utc>,
    /// Fraction of defective output (0-1)
    #[serde(default, alias = "defect_rate")]
    pub defect_rate: f64,
}

impl Timestamped for StatusRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for ProductionRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for QualityRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// The three chronologically sorted record sequences fetched for one device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub status: Vec<StatusRecord>,
    pub production: Vec<ProductionRecord>,
    pub quality: Vec<QualityRecord>,
}

impl RecordSet {
    pub fn new(
        status: Vec<StatusRecord>,
        production: Vec<ProductionRecord>,
        quality: Vec<QualityRecord>,
    ) -> Self {
        Self {
            status,
            production,
            quality,
        }
    }

    /// Records whose timestamp lies in `[period.start, period.end]` (both inclusive).
    ///
    /// Binary-searches each sequence, so they must be in chronological order.
    pub fn within(&self, period: &Period) -> Self {
        Self {
            status: filter_to_period(&self.status, period),
            production: filter_to_period(&self.production, period),
            quality: filter_to_period(&self.quality, period),
        }
    }
}

fn filter_to_period<T: Timestamped + Clone>(records: &[T], period: &Period) -> Vec<T> {
    let lo = records.partition_point(|r| r.timestamp() < period.start);
    let hi = records.partition_point(|r| r.timestamp() <= period.end);
    records.get(lo..hi).map_or_else(Vec::new, <[T]>::to_vec)
}

// ============================================================================
// Windows
// ============================================================================

/// Elapsed hours from `from` to `to` (negative if `to` precedes `from`).
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// A span of time. Unlike [`TimeWindow`], a period may be empty.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn hours(&self) -> f64 {
        hours_between(self.start, self.end)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Query window with `start < end` guaranteed by construction.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EngineError> {
        if end <= start {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Total equipment time in hours.
    pub fn total_hours(&self) -> f64 {
        hours_between(self.start, self.end)
    }

    pub fn as_period(&self) -> Period {
        Period::new(self.start, self.end)
    }
}
