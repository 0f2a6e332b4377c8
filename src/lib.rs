//! OEE Analytics: Overall Equipment Effectiveness for factory devices
//!
//! Turns a device's machine-status, production and quality records into
//! OEE metrics over a time window.
//!
//! ## Architecture
//!
//! - **Engine**: Time buckets, ratios, stop segmentation, waterfall and timeline
//! - **Storage**: Sled-backed record store and JSON-lines import
//! - **API**: Axum REST endpoints wrapping the engine
//! - **Config**: TOML configuration with validation

pub mod api;
pub mod config;
pub mod engine;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, OeeConfig};

// Re-export the engine facade and its errors
pub use engine::{EngineError, EngineSettings, OeeAnalyzer};

// Re-export storage
pub use storage::{DeviceKey, RecordSource, RecordStore, StorageError};

// Re-export commonly used types
pub use types::{
    Interval, MachineStatus, OeeMetrics, OeeRatios, ProductionRecord, QualityRecord, RecordSet,
    StatusRecord, TimeBuckets, TimeWindow,
};
