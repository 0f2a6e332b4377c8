//! Sled-backed device record store
//!
//! One tree per record kind. Keys are `{factory}\0{device}\0` followed by the
//! timestamp in milliseconds as 8 big-endian bytes with the sign bit flipped,
//! so a range scan over one device's prefix walks records chronologically.
//! Values are JSON. Two records of the same kind and device at the same
//! millisecond overwrite each other.
//!
//! Catalog trees:
//! - `factories`: `{factory}` → [`FactoryEntry`]
//! - `devices`: `{factory}\0{device}` → [`DeviceInfo`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{DeviceInfo, DeviceKey, FactoryInfo, RecordSource, StorageError, StoreCounts};
use crate::types::{ProductionRecord, QualityRecord, StatusRecord, TimeWindow};

const STATUS_TREE: &str = "machine_status";
const PRODUCTION_TREE: &str = "production";
const QUALITY_TREE: &str = "quality_check";
const FACTORY_TREE: &str = "factories";
const DEVICE_TREE: &str = "devices";

/// Stored factory row; the display name is optional at import time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactoryEntry {
    id: String,
    name: Option<String>,
}

/// Device record persistent storage
#[derive(Clone)]
pub struct RecordStore {
    db: sled::Db,
    status: sled::Tree,
    production: sled::Tree,
    quality: sled::Tree,
    factories: sled::Tree,
    devices: sled::Tree,
}

impl RecordStore {
    /// Open or create the record database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::from_db(sled::open(path)?)
    }

    /// Open a throwaway in-memory database (tests, dry runs)
    pub fn open_temporary() -> Result<Self, StorageError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            status: db.open_tree(STATUS_TREE)?,
            production: db.open_tree(PRODUCTION_TREE)?,
            quality: db.open_tree(QUALITY_TREE)?,
            factories: db.open_tree(FACTORY_TREE)?,
            devices: db.open_tree(DEVICE_TREE)?,
            db,
        })
    }

    pub fn insert_status(&self, device: &DeviceKey, record: &StatusRecord) -> Result<(), StorageError> {
        insert_record(&self.status, device, record.timestamp, record)
    }

    pub fn insert_production(
        &self,
        device: &DeviceKey,
        record: &ProductionRecord,
    ) -> Result<(), StorageError> {
        insert_record(&self.production, device, record.timestamp, record)
    }

    pub fn insert_quality(&self, device: &DeviceKey, record: &QualityRecord) -> Result<(), StorageError> {
        insert_record(&self.quality, device, record.timestamp, record)
    }

    /// Register a factory. An existing name is never replaced by `None`.
    pub fn register_factory(&self, factory_id: &str, name: Option<&str>) -> Result<(), StorageError> {
        if name.is_none() && self.factories.contains_key(factory_id.as_bytes())? {
            return Ok(());
        }
        let entry = FactoryEntry {
            id: factory_id.to_string(),
            name: name.map(str::to_string),
        };
        self.factories
            .insert(factory_id.as_bytes(), serde_json::to_vec(&entry)?)?;
        Ok(())
    }

    /// Register a device. An existing type is never replaced by `None`.
    pub fn register_device(&self, device: &DeviceKey, device_type: Option<&str>) -> Result<(), StorageError> {
        let key = device_prefix(device);
        if device_type.is_none() && self.devices.contains_key(&key)? {
            return Ok(());
        }
        let info = DeviceInfo {
            id: device.device_id.clone(),
            device_type: device_type.map(str::to_string),
        };
        self.devices.insert(key, serde_json::to_vec(&info)?)?;
        Ok(())
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordSource for RecordStore {
    async fn factories(&self) -> Result<Vec<FactoryInfo>, StorageError> {
        self.factories
            .iter()
            .values()
            .map(|value| -> Result<FactoryInfo, StorageError> {
                let entry: FactoryEntry = serde_json::from_slice(&value?)?;
                Ok(FactoryInfo {
                    name: entry.name.unwrap_or_else(|| format!("Factory {}", entry.id)),
                    id: entry.id,
                })
            })
            .collect()
    }

    async fn devices(&self, factory_id: &str) -> Result<Vec<DeviceInfo>, StorageError> {
        let mut prefix = factory_id.as_bytes().to_vec();
        prefix.push(0);
        self.devices
            .scan_prefix(prefix)
            .values()
            .map(|value| -> Result<DeviceInfo, StorageError> {
                Ok(serde_json::from_slice(&value?)?)
            })
            .collect()
    }

    async fn status_records(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<Vec<StatusRecord>, StorageError> {
        scan_window(&self.status, device, window)
    }

    async fn production_records(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<Vec<ProductionRecord>, StorageError> {
        scan_window(&self.production, device, window)
    }

    async fn quality_records(
        &self,
        device: &DeviceKey,
        window: &TimeWindow,
    ) -> Result<Vec<QualityRecord>, StorageError> {
        scan_window(&self.quality, device, window)
    }

    async fn counts(&self) -> Result<StoreCounts, StorageError> {
        Ok(StoreCounts {
            status: self.status.len(),
            production: self.production.len(),
            quality: self.quality.len(),
        })
    }
}

// ============================================================================
// Key Encoding
// ============================================================================

fn device_prefix(device: &DeviceKey) -> Vec<u8> {
    let mut key = Vec::with_capacity(device.factory_id.len() + device.device_id.len() + 10);
    key.extend_from_slice(device.factory_id.as_bytes());
    key.push(0);
    key.extend_from_slice(device.device_id.as_bytes());
    key.push(0);
    key
}

/// Order-preserving encoding of a signed millisecond timestamp.
fn encode_timestamp(ts: DateTime<Utc>) -> [u8; 8] {
    ((ts.timestamp_millis() as u64) ^ (1 << 63)).to_be_bytes()
}

fn record_key(device: &DeviceKey, ts: DateTime<Utc>) -> Vec<u8> {
    let mut key = device_prefix(device);
    key.extend_from_slice(&encode_timestamp(ts));
    key
}

fn insert_record<T: Serialize>(
    tree: &sled::Tree,
    device: &DeviceKey,
    ts: DateTime<Utc>,
    record: &T,
) -> Result<(), StorageError> {
    tree.insert(record_key(device, ts), serde_json::to_vec(record)?)?;
    Ok(())
}

/// Records of one device with `start <= timestamp <= end`, oldest first.
fn scan_window<T: DeserializeOwned>(
    tree: &sled::Tree,
    device: &DeviceKey,
    window: &TimeWindow,
) -> Result<Vec<T>, StorageError> {
    let lo = record_key(device, window.start());
    let hi = record_key(device, window.end());
    let records = tree
        .range(lo..=hi)
        .values()
        .map(|value| -> Result<T, StorageError> { Ok(serde_json::from_slice(&value?)?) })
        .collect::<Result<Vec<T>, StorageError>>()?;
    debug!(device = %device, count = records.len(), "Scanned records");
    Ok(records)
}
