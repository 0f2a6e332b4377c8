//! OEE Analyzer
//!
//! Facade running the engine's control flow for one pre-fetched record batch:
//! 1. Time-bucket calculation + ratio derivation → summary metrics
//! 2. Summary buckets → waterfall steps
//! 3. Status records → categorised stops and per-reason totals
//! 4. Window partitioning → per-period timeline
//!
//! An empty status sequence produces `DataStatus::Unavailable` reports with
//! no numbers in them rather than placeholder values.

use serde::Serialize;
use tracing::debug;

use super::{
    aggregate_timeline, build_waterfall, calculate_time_buckets, count_periods, derive_ratios,
    group_by_category, partition, segment_stops, summarize_causes, EngineError, EngineSettings,
};
use crate::types::{
    DataStatus, Interval, OeeMetrics, OeeRatios, Period, RecordSet, StopCauseSummary,
    StopsByCategory, TimeWindow, TimelinePoint, WaterfallStep,
};

/// Summary metrics for a window.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OeeSummary {
    pub data_status: DataStatus,
    pub metrics: Option<OeeMetrics>,
}

/// Waterfall steps plus the headline ratios.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallReport {
    pub data_status: DataStatus,
    pub waterfall_data: Vec<WaterfallStep>,
    pub metrics: Option<OeeRatios>,
}

/// Per-period ratio series.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineReport {
    pub interval: Interval,
    pub timeline: Vec<TimelinePoint>,
}

/// Stops grouped by category plus per-reason totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StopCauseReport {
    pub stops_by_category: StopsByCategory,
    pub causes: Vec<StopCauseSummary>,
    pub total_stop_hours: f64,
}

/// Engine facade configured once and shared across requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct OeeAnalyzer {
    settings: EngineSettings,
}

impl OeeAnalyzer {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Buckets and ratios for one period of pre-filtered records.
    pub fn metrics_for(&self, records: &RecordSet, period: Period) -> Result<OeeMetrics, EngineError> {
        let breakdown = calculate_time_buckets(
            &records.status,
            &records.production,
            &records.quality,
            period.hours(),
            &self.settings,
        )?;
        let ratios = derive_ratios(&breakdown.buckets);
        Ok(OeeMetrics {
            period,
            breakdown,
            ratios,
        })
    }

    pub fn summary(&self, records: &RecordSet, window: &TimeWindow) -> OeeSummary {
        match self.metrics_for(records, window.as_period()) {
            Ok(metrics) => OeeSummary {
                data_status: DataStatus::Available,
                metrics: Some(metrics),
            },
            Err(e) => {
                debug!(reason = %e, "Summary unavailable");
                OeeSummary {
                    data_status: DataStatus::Unavailable,
                    metrics: None,
                }
            }
        }
    }

    pub fn waterfall(&self, records: &RecordSet, window: &TimeWindow) -> WaterfallReport {
        let summary = self.summary(records, window);
        match summary.metrics {
            Some(metrics) => WaterfallReport {
                data_status: DataStatus::Available,
                waterfall_data: build_waterfall(&metrics.breakdown.buckets),
                metrics: Some(metrics.ratios),
            },
            None => WaterfallReport {
                data_status: DataStatus::Unavailable,
                waterfall_data: Vec::new(),
                metrics: None,
            },
        }
    }

    /// Reject windows that would exceed the configured period limit.
    ///
    /// Cheap enough to run before any records are fetched.
    pub fn check_timeline_size(&self, window: &TimeWindow, interval: Interval) -> Result<(), EngineError> {
        let count = count_periods(window.start(), window.end(), interval);
        if count > self.settings.max_periods {
            return Err(EngineError::TooManyPeriods {
                count,
                limit: self.settings.max_periods,
            });
        }
        Ok(())
    }

    /// Partition the window and compute one point per period.
    pub fn timeline(
        &self,
        records: &RecordSet,
        window: &TimeWindow,
        interval: Interval,
    ) -> Result<TimelineReport, EngineError> {
        self.check_timeline_size(window, interval)?;
        let periods = partition(window.start(), window.end(), interval);
        Ok(TimelineReport {
            interval,
            timeline: aggregate_timeline(records, &periods, &self.settings),
        })
    }

    pub fn stop_causes(&self, records: &RecordSet) -> StopCauseReport {
        let stops = segment_stops(&records.status);
        StopCauseReport {
            stops_by_category: group_by_category(&stops),
            causes: summarize_causes(&stops),
            total_stop_hours: stops.iter().map(|s| s.duration_hours).sum(),
        }
    }
}
