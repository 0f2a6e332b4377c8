//! Stop Segmenter
//!
//! Scans adjacent status pairs and emits one stop per maximal run of a single
//! non-running status. A run is extended while the status repeats and closed
//! by a running record or a different status. The final record opens nothing,
//! since it has no successor to bound it. A pair whose timestamps run
//! backwards accrues nothing and closes any open stop.

use std::collections::HashMap;

use crate::types::{
    hours_between, StatusRecord, StopCategory, StopCauseSummary, StopEvent, StopsByCategory,
};

/// Segment an ordered status sequence into chronological stop events.
///
/// Empty and single-record inputs yield no stops.
pub fn segment_stops(records: &[StatusRecord]) -> Vec<StopEvent> {
    let (stops, _) = records.windows(2).fold(
        (Vec::<StopEvent>::new(), false),
        |(mut stops, open), pair| {
            let (current, next) = (&pair[0], &pair[1]);
            if current.status.is_running() {
                return (stops, false);
            }

            let duration = hours_between(current.timestamp, next.timestamp);
            if duration < 0.0 {
                return (stops, false);
            }
            match stops.last_mut() {
                Some(last) if open && last.status == current.status => {
                    last.end_time = next.timestamp;
                    last.duration_hours += duration;
                }
                _ => stops.push(StopEvent {
                    start_time: current.timestamp,
                    end_time: next.timestamp,
                    duration_hours: duration,
                    status: current.status,
                    category: StopCategory::for_status(current.status),
                    reason: current.status.stop_reason(),
                }),
            }
            (stops, true)
        },
    );
    stops
}

/// Split stops into their loss categories, preserving order.
pub fn group_by_category(stops: &[StopEvent]) -> StopsByCategory {
    let mut grouped = StopsByCategory::default();
    for stop in stops {
        let bucket = match stop.category {
            StopCategory::LossDuringOperation => &mut grouped.loss_during_operation,
            StopCategory::BatchSpecificNonOperation => &mut grouped.batch_specific,
            StopCategory::NonProductionActivities => &mut grouped.non_production,
            StopCategory::Unknown => &mut grouped.unknown,
        };
        bucket.push(stop.clone());
    }
    grouped
}

/// Total stop hours per reason, largest first.
pub fn summarize_causes(stops: &[StopEvent]) -> Vec<StopCauseSummary> {
    let total: f64 = stops.iter().map(|s| s.duration_hours).sum();

    let mut by_reason: HashMap<&'static str, StopCauseSummary> = HashMap::new();
    for stop in stops {
        let entry = by_reason.entry(stop.reason).or_insert(StopCauseSummary {
            reason: stop.reason,
            category: stop.category,
            category_label: stop.category.label(),
            total_hours: 0.0,
            occurrences: 0,
            share_percent: 0.0,
        });
        entry.total_hours += stop.duration_hours;
        entry.occurrences += 1;
    }

    let mut causes: Vec<StopCauseSummary> = by_reason
        .into_values()
        .map(|mut cause| {
            cause.share_percent = if total > 0.0 {
                cause.total_hours / total * 100.0
            } else {
                0.0
            };
            cause
        })
        .collect();
    causes.sort_by(|a, b| {
        b.total_hours
            .total_cmp(&a.total_hours)
            .then_with(|| a.reason.cmp(b.reason))
    });
    causes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MachineStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn seq(statuses: &[MachineStatus]) -> Vec<StatusRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| StatusRecord {
                timestamp: t(i as i64),
                status,
            })
            .collect()
    }

    #[test]
    fn test_adjacent_same_status_merges_into_one_stop() {
        use MachineStatus::*;
        let stops = segment_stops(&seq(&[Running, Error, Error, Running]));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].start_time, t(1));
        assert_eq!(stops[0].end_time, t(3));
        assert_eq!(stops[0].duration_hours, 2.0);
        assert_eq!(stops[0].category, StopCategory::LossDuringOperation);
        assert_eq!(stops[0].reason, "Equipment Failure");
    }

    #[test]
    fn test_status_change_closes_stop() {
        use MachineStatus::*;
        let stops = segment_stops(&seq(&[Setup, Maintenance, Maintenance, Stopped, Running]));
        let statuses: Vec<_> = stops.iter().map(|s| s.status).collect();
        assert_eq!(statuses, vec![Setup, Maintenance, Stopped]);
        assert_eq!(stops[1].duration_hours, 2.0);
        assert_eq!(stops[2].category, StopCategory::NonProductionActivities);
    }

    #[test]
    fn test_backward_pair_accrues_no_stop_time() {
        use MachineStatus::*;
        let records = [
            StatusRecord { timestamp: t(3), status: Error },
            StatusRecord { timestamp: t(1), status: Idle },
            StatusRecord { timestamp: t(2), status: Running },
        ];
        let stops = segment_stops(&records);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].status, Idle);
        assert_eq!(stops[0].duration_hours, 1.0);
        assert!(stops.iter().all(|s| s.duration_hours >= 0.0));

        let causes = summarize_causes(&stops);
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].reason, "Idle Time");
        assert_eq!(causes[0].category_label, "Loss During Operation");
        assert!((causes[0].share_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_backward_pair_splits_repeated_status() {
        use MachineStatus::*;
        let records = [
            StatusRecord { timestamp: t(0), status: Error },
            StatusRecord { timestamp: t(2), status: Error },
            StatusRecord { timestamp: t(1), status: Error },
            StatusRecord { timestamp: t(4), status: Running },
        ];
        let stops = segment_stops(&records);
        let durations: Vec<f64> = stops.iter().map(|s| s.duration_hours).collect();
        assert_eq!(durations, vec![2.0, 3.0]);
        assert!(stops.iter().all(|s| s.end_time > s.start_time));
    }

    #[test]
    fn test_running_between_same_status_splits_stops() {
        use MachineStatus::*;
        let stops = segment_stops(&seq(&[Idle, Running, Idle, Running]));
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn test_trailing_stop_ends_at_last_record() {
        use MachineStatus::*;
        let stops = segment_stops(&seq(&[Running, Error, Error]));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].end_time, t(2));
        assert_eq!(stops[0].duration_hours, 1.0);
    }

    #[test]
    fn test_empty_and_single_record_inputs() {
        assert!(segment_stops(&[]).is_empty());
        assert!(segment_stops(&seq(&[MachineStatus::Error])).is_empty());
    }

    #[test]
    fn test_unknown_status_is_kept() {
        use MachineStatus::*;
        let stops = segment_stops(&seq(&[Unknown, Running]));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].category, StopCategory::Unknown);
        assert_eq!(group_by_category(&stops).unknown.len(), 1);
    }

    #[test]
    fn test_group_and_summarize() {
        use MachineStatus::*;
        let stops = segment_stops(&seq(&[Error, Running, Setup, Setup, Setup, Running, Error, Running]));
        let grouped = group_by_category(&stops);
        assert_eq!(grouped.loss_during_operation.len(), 2);
        assert_eq!(grouped.batch_specific.len(), 1);
        assert!(grouped.non_production.is_empty());

        let causes = summarize_causes(&stops);
        assert_eq!(causes[0].reason, "Setup/Changeover");
        assert_eq!(causes[0].total_hours, 3.0);
        assert_eq!(causes[1].occurrences, 2);
        assert!((causes[0].share_percent - 60.0).abs() < 1e-9);
    }
}
