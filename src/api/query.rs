//! Query-string parsing shared by the OEE endpoints
//!
//! Dates accept RFC 3339 instants or plain `YYYY-MM-DD` (read as UTC midnight).
//! Blank values count as absent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::error::ApiError;
use crate::storage::DeviceKey;
use crate::types::{Interval, TimeWindow};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OeeQuery {
    pub factory_id: Option<String>,
    pub device_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceQuery {
    pub factory_id: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub(crate) fn require<'a>(value: Option<&'a String>, name: &str) -> Result<&'a str, ApiError> {
    present(value).ok_or_else(|| ApiError::BadRequest(format!("'{name}' is required")))
}

/// Parse an RFC 3339 instant or a `YYYY-MM-DD` date.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn instant_or(value: Option<&String>, name: &str, fallback: DateTime<Utc>) -> Result<DateTime<Utc>, ApiError> {
    match present(value) {
        None => Ok(fallback),
        Some(raw) => parse_instant(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "'{name}' must be an RFC 3339 instant or YYYY-MM-DD, got '{raw}'"
            ))
        }),
    }
}

impl OeeQuery {
    pub fn device(&self) -> Result<DeviceKey, ApiError> {
        let factory_id = require(self.factory_id.as_ref(), "factoryId")?;
        let device_id = require(self.device_id.as_ref(), "deviceId")?;
        Ok(DeviceKey::new(factory_id, device_id))
    }

    /// Resolve the window, falling back to `default_start` and `now`.
    pub fn window(&self, default_start: DateTime<Utc>, now: DateTime<Utc>) -> Result<TimeWindow, ApiError> {
        let start = instant_or(self.start_date.as_ref(), "startDate", default_start)?;
        let end = instant_or(self.end_date.as_ref(), "endDate", now)?;
        Ok(TimeWindow::new(start, end)?)
    }

    pub fn interval(&self, default: Interval) -> Result<Interval, ApiError> {
        match present(self.interval.as_ref()) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(ApiError::BadRequest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn query(start: Option<&str>, end: Option<&str>) -> OeeQuery {
        OeeQuery {
            factory_id: Some("F1".into()),
            device_id: Some("cnc-1".into()),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
            interval: None,
        }
    }

    #[test]
    fn test_parse_instant_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_instant("2024-03-05"), Some(midnight));
        assert_eq!(parse_instant("2024-03-05T00:00:00Z"), Some(midnight));
        assert_eq!(
            parse_instant("2024-03-05T02:00:00+02:00"),
            Some(midnight)
        );
        assert_eq!(parse_instant("05/03/2024"), None);
    }

    #[test]
    fn test_window_defaults() {
        let default_start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let window = query(None, Some("  ")).window(default_start, now).unwrap();
        assert_eq!(window.start(), default_start);
        assert_eq!(window.end(), now);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let now = Utc::now();
        let err = query(Some("2024-02-01"), Some("2024-01-01"))
            .window(now, now)
            .unwrap_err();
        assert!(matches!(err, ApiError::Engine(_)));
    }

    #[test]
    fn test_missing_device_rejected() {
        let mut q = query(None, None);
        q.device_id = Some(String::new());
        match q.device() {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("deviceId")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_interval_parsing() {
        let mut q = query(None, None);
        assert_eq!(q.interval(Interval::Daily).unwrap(), Interval::Daily);
        q.interval = Some("Weekly".into());
        assert_eq!(q.interval(Interval::Daily).unwrap(), Interval::Weekly);
        q.interval = Some("monthly".into());
        assert!(matches!(q.interval(Interval::Daily), Err(ApiError::BadRequest(_))));
    }
}
