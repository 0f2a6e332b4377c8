//! OEE Calculation Engine
//!
//! Converts ordered machine-status observations plus production and quality
//! samples into nested time buckets, OEE ratios, categorised stops, waterfall
//! steps and per-period timelines.
//!
//! ## Architecture
//! - `time_buckets`: duration-in-state accumulation and bucket folding
//! - `ratios`: OEE1/OEE2/OEE3/TCU with zero-denominator policy
//! - `stop_segmenter`: contiguous non-running intervals with loss categories
//! - `waterfall`: bridge-chart steps from the bucket hierarchy
//! - `periods`: fixed-granularity window partitioning
//! - `timeline`: per-period recomputation, optionally fanned out with rayon
//! - `analyzer`: facade running the above for one record batch
//!
//! Every function here is synchronous and side-effect free. Callers fetch
//! records and run the engine off the async executor.

pub mod analyzer;
pub mod periods;
pub mod ratios;
pub mod stop_segmenter;
pub mod time_buckets;
pub mod timeline;
pub mod waterfall;

pub use analyzer::{OeeAnalyzer, OeeSummary, StopCauseReport, TimelineReport, WaterfallReport};
pub use periods::{count_periods, partition};
pub use ratios::derive_ratios;
pub use stop_segmenter::{group_by_category, segment_stops, summarize_causes};
pub use time_buckets::{accumulate_status_hours, calculate_time_buckets};
pub use timeline::{aggregate_timeline, compute_period};
pub use waterfall::{bridge_total, build_waterfall};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::defaults;

/// Errors raised by the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid window: end {end} must be after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Insufficient status data: no machine status records in window")]
    InsufficientStatusData,

    #[error("Timeline would contain {count} periods, limit is {limit}")]
    TooManyPeriods { count: usize, limit: usize },
}

/// Tuning knobs the engine reads on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Efficiency applied to running time when no production records exist
    pub assumed_efficiency_percent: f64,
    /// Timelines with at least this many periods are computed in parallel
    pub parallel_min_periods: usize,
    /// Upper bound on periods per timeline request
    pub max_periods: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            assumed_efficiency_percent: defaults::ASSUMED_EFFICIENCY_PERCENT,
            parallel_min_periods: defaults::PARALLEL_MIN_PERIODS,
            max_periods: defaults::MAX_TIMELINE_PERIODS,
        }
    }
}
