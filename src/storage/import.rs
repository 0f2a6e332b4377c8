//! JSON-lines import of tagged sensor documents
//!
//! Each line is one document from a single-collection sensor feed, told apart
//! by its `type` tag:
//!
//! ```text
//! {"type":"machine_status","factoryId":"F1","deviceId":"cnc-1","timestamp":"2024-01-01T06:00:00Z","status":"running"}
//! {"type":"production","factoryId":"F1","deviceId":"cnc-1","timestamp":"...","interval_count":42,"efficiency":87.5}
//! {"type":"quality_check","factoryId":"F1","deviceId":"cnc-1","timestamp":"...","defect_rate":0.02}
//! ```
//!
//! Optional `factoryName` and `deviceType` fields populate the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, info};

use super::{DeviceKey, RecordStore, StorageError};
use crate::types::{MachineStatus, ProductionRecord, QualityRecord, StatusRecord};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum DocumentKind {
    MachineStatus,
    Production,
    QualityCheck,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorDocument {
    #[serde(rename = "type")]
    kind: DocumentKind,
    #[serde(alias = "factory_id")]
    factory_id: String,
    #[serde(default, alias = "factory_name")]
    factory_name: Option<String>,
    #[serde(alias = "device_id")]
    device_id: String,
    #[serde(default, alias = "device_type")]
    device_type: Option<String>,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    status: Option<MachineStatus>,
    #[serde(default, alias = "interval_count")]
    interval_count: Option<f64>,
    #[serde(default)]
    efficiency: Option<f64>,
    #[serde(default, alias = "defect_rate")]
    defect_rate: Option<f64>,
}

/// Counts of imported documents per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub status: usize,
    pub production: usize,
    pub quality: usize,
    pub skipped_blank: usize,
}

impl ImportStats {
    pub fn total(&self) -> usize {
        self.status + self.production + self.quality
    }
}

/// Load every document from `reader` into `store`.
///
/// Stops at the first malformed line and reports its 1-based line number.
/// Documents before that line stay imported.
pub fn import_jsonl<R: BufRead>(store: &RecordStore, reader: R) -> Result<ImportStats, StorageError> {
    let mut stats = ImportStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            stats.skipped_blank += 1;
            continue;
        }

        let doc: SensorDocument = serde_json::from_str(&line).map_err(|e| StorageError::Import {
            line: line_no,
            message: e.to_string(),
        })?;
        let device = DeviceKey::new(&doc.factory_id, &doc.device_id);
        store.register_factory(&doc.factory_id, doc.factory_name.as_deref())?;
        store.register_device(&device, doc.device_type.as_deref())?;

        match doc.kind {
            DocumentKind::MachineStatus => {
                let status = doc.status.ok_or_else(|| StorageError::Import {
                    line: line_no,
                    message: "machine_status document has no 'status' field".to_string(),
                })?;
                store.insert_status(
                    &device,
                    &StatusRecord {
                        timestamp: doc.timestamp,
                        status,
                    },
                )?;
                stats.status += 1;
            }
            DocumentKind::Production => {
                store.insert_production(
                    &device,
                    &ProductionRecord {
                        timestamp: doc.timestamp,
                        interval_count: doc.interval_count.unwrap_or(0.0),
                        efficiency: doc.efficiency.unwrap_or(0.0),
                    },
                )?;
                stats.production += 1;
            }
            DocumentKind::QualityCheck => {
                store.insert_quality(
                    &device,
                    &QualityRecord {
                        timestamp: doc.timestamp,
                        defect_rate: doc.defect_rate.unwrap_or(0.0),
                    },
                )?;
                stats.quality += 1;
            }
        }
        debug!(line = line_no, kind = ?doc.kind, device = %device, "Imported document");
    }

    store.flush()?;
    info!(
        status = stats.status,
        production = stats.production,
        quality = stats.quality,
        "Import complete"
    );
    Ok(stats)
}
