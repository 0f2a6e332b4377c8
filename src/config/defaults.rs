//! System-wide default constants.
//!
//! Every value here can be overridden from `oee_config.toml`.

// ============================================================================
// Engine
// ============================================================================

/// Efficiency applied to running time when a window has no production records (%).
pub const ASSUMED_EFFICIENCY_PERCENT: f64 = 80.0;

/// Timelines with at least this many periods are computed on the rayon pool.
pub const PARALLEL_MIN_PERIODS: usize = 64;

/// Upper bound on periods in one timeline request.
///
/// 10 000 hourly periods is a little over 13 months.
pub const MAX_TIMELINE_PERIODS: usize = 10_000;

// ============================================================================
// Requests
// ============================================================================

/// Window start used when a request omits `startDate`.
pub const DEFAULT_START: &str = "2023-01-01T00:00:00Z";

// ============================================================================
// Server & Storage
// ============================================================================

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

pub const DEFAULT_STORAGE_PATH: &str = "./data/oee_records.db";
