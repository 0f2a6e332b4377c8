//! API route handlers
//!
//! Request handling logic for all API endpoints including:
//! - OEE summary, waterfall, timeline and stop-cause reports
//! - Factory and device catalog
//! - Liveness with record store counts

mod catalog;
mod health;
mod oee;

pub use catalog::*;
pub use health::*;
pub use oee::*;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::engine::OeeAnalyzer;
use crate::storage::RecordSource;
use crate::types::Interval;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Where device records come from
    pub store: Arc<dyn RecordSource>,
    /// Engine facade with the configured settings
    pub analyzer: OeeAnalyzer,
    /// Window start used when `startDate` is omitted
    pub default_start: DateTime<Utc>,
    /// Timeline interval used when `interval` is omitted
    pub default_interval: Interval,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(store: Arc<dyn RecordSource>, engine: &EngineConfig) -> Self {
        Self {
            store,
            analyzer: OeeAnalyzer::new(engine.settings()),
            // Config validation rejects unparsable starts before we get here.
            default_start: engine.default_start_instant().unwrap_or(DateTime::UNIX_EPOCH),
            default_interval: engine.default_interval,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
