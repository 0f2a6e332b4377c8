//! Record storage: the data-access side of the engine
//!
//! - `RecordSource`: async contract the API fetches records through
//! - `RecordStore`: sled-backed implementation keyed by device and timestamp
//! - `import`: JSON-lines loader for tagged sensor documents
//!
//! Every fetch returns chronologically sorted records restricted to the
//! requested window, and an empty vector (never an error) when nothing matches.

pub mod import;
mod records;

pub use import::{import_jsonl, ImportStats};
pub use records::RecordStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductionRecord, QualityRecord, RecordSet, StatusRecord, TimeWindow};

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import error on line {line}: {message}")]
    Import { line: usize, message: String },
}

/// Identifies one device of one factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKey {
    pub factory_id: String,
    pub device_id: String,
}

impl DeviceKey {
    pub fn new(factory_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            factory_id: factory_id.into(),
            device_id: device_id.into(),
        }
    }
}

impl std::fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.factory_id, self.device_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub id: String,
    pub device_type: Option<String>,
}

/// Stored record totals, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub status: usize,
    pub production: usize,
    pub quality: usize,
}

/// Source of device records for a time window.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn factories(&self) -> Result<Vec<FactoryInfo>, StorageError>;

    async fn devices(&self, factory_id: &str) -> Result<Vec<DeviceInfo>, StorageError>;

    async fn status_records(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<Vec<StatusRecord>, StorageError>;

    async fn production_records(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<Vec<ProductionRecord>, StorageError>;

    async fn quality_records(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<Vec<QualityRecord>, StorageError>;

    async fn counts(&self) -> Result<StoreCounts, StorageError>;

    /// All three record kinds for one device and window.
    async fn record_set(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<RecordSet, StorageError> {
        let (status, production, quality) = tokio::try_join!(
            self.status_records(device, window),
            self.production_records(device, window),
            self.quality_records(device, window),
        )?;
        Ok(RecordSet::new(status, production, quality))
    }
}
