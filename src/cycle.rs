//! Cycle analysis
//!
//! Turns a per-day drift into a free-running cycle length and computes the
//! average amount of sleep per day, over all records and over the visible
//! window.

use crate::config::EngineConfig;
use crate::drift::DriftCalculator;
use crate::grouping::DayGrouper;
use crate::store::RecordStore;
use crate::types::{CycleMetrics, DriftResult, SleepRecord, MS_PER_DAY, MS_PER_MINUTE};
use tracing::debug;

/// Drifts smaller than this count as "no measurable drift"
pub const MIN_MEASURABLE_DRIFT_MS: f64 = MS_PER_MINUTE;

/// Derives cycle length and average sleep figures
pub struct CycleAnalyzer;

impl CycleAnalyzer {
    /// Days needed for sleep onset to return to the same clock time.
    ///
    /// The drift is folded into (-12h, 12h] first. Returns 0 when its
    /// magnitude is under one minute (or not a number); otherwise
    /// `round(24h / |drift|)`. A 25-hour rhythm (+1h/day) gives 24.
    pub fn cycle_length(total_drift_ms: f64) -> u32 {
        let magnitude = DriftCalculator::fold_day_ms(total_drift_ms).abs();
        if !magnitude.is_finite() || magnitude < MIN_MEASURABLE_DRIFT_MS {
            return 0;
        }
        (MS_PER_DAY / magnitude).round() as u32
    }

    /// Average total sleep per day with data, naps included.
    ///
    /// Returns `NaN` for an empty slice; callers treat that as "no data".
    pub fn average_sleep(records: &[SleepRecord]) -> f64 {
        let groups = DayGrouper::group_by_day(records);
        let total: f64 = groups
            .iter()
            .map(|group| {
                group
                    .indices
                    .iter()
                    .filter_map(|&i| records.get(i))
                    .map(SleepRecord::duration_ms)
                    .sum::<f64>()
            })
            .sum();
        total / groups.len() as f64
    }

    /// Average sleep per day over the whole store, or over the visible
    /// window when `windowed` is set.
    pub fn average_sleep_per_day(store: &RecordStore, config: &EngineConfig, windowed: bool) -> f64 {
        if windowed {
            Self::average_sleep(&store.visible(config.max_entries))
        } else {
            Self::average_sleep(store.records())
        }
    }

    /// All cycle figures for one configuration.
    ///
    /// `total_drift` is the drift over the main sleeps of the whole store; the
    /// visible drift and both sleep averages are computed here from scratch.
    pub fn metrics(
        store: &RecordStore,
        config: &EngineConfig,
        total_drift: &DriftResult,
    ) -> CycleMetrics {
        let visible = store.visible(config.max_entries);
        let visible_entries = DayGrouper::main_sleep_entries(&visible, config.averaging_days);
        let visible_drift = DriftCalculator::drift(&visible_entries);

        let metrics = CycleMetrics {
            cycle_length_days: Self::cycle_length(total_drift.sleep_drift_ms),
            total_drift_ms: total_drift.sleep_drift_ms,
            visible_drift_ms: visible_drift.sleep_drift_ms,
            avg_sleep_all_days_ms: Self::average_sleep(store.records()),
            avg_sleep_visible_days_ms: Self::average_sleep(&visible),
        };

        debug!(
            cycle_length_days = metrics.cycle_length_days,
            visible_records = visible.len(),
            "computed cycle metrics"
        );
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use crate::types::MS_PER_HOUR;

    fn record(sleep: &str, wake: &str) -> SleepRecord {
        SleepRecord::new(Timestamp::parse(sleep), Timestamp::parse(wake), 3, "")
    }

    #[test]
    fn test_one_hour_drift_is_24_days() {
        assert_eq!(CycleAnalyzer::cycle_length(MS_PER_HOUR), 24);
        assert_eq!(CycleAnalyzer::cycle_length(-MS_PER_HOUR), 24);
    }

    #[test]
    fn test_thirty_minute_drift_is_48_days() {
        assert_eq!(CycleAnalyzer::cycle_length(30.0 * MS_PER_MINUTE), 48);
    }

    #[test]
    fn test_rounds_rather_than_truncates() {
        // 24h / 25m = 57.6 days
        assert_eq!(CycleAnalyzer::cycle_length(25.0 * MS_PER_MINUTE), 58);
    }

    #[test]
    fn test_no_measurable_drift() {
        assert_eq!(CycleAnalyzer::cycle_length(0.0), 0);
        assert_eq!(CycleAnalyzer::cycle_length(59_999.0), 0);
        assert_eq!(CycleAnalyzer::cycle_length(-59_999.0), 0);
        assert_eq!(CycleAnalyzer::cycle_length(MS_PER_DAY), 0);
        assert_eq!(CycleAnalyzer::cycle_length(f64::NAN), 0);
        assert_eq!(CycleAnalyzer::cycle_length(MIN_MEASURABLE_DRIFT_MS), 1440);
    }

    #[test]
    fn test_drift_folded_before_inverting() {
        // +23h per day is really -1h per day
        assert_eq!(CycleAnalyzer::cycle_length(23.0 * MS_PER_HOUR), 24);
    }

    #[test]
    fn test_average_sleep_two_days() {
        let records = vec![
            record("2024-01-01T23:00:00Z", "2024-01-02T06:00:00Z"),
            record("2024-01-02T22:00:00Z", "2024-01-03T07:00:00Z"),
        ];
        assert_eq!(CycleAnalyzer::average_sleep(&records), 8.0 * MS_PER_HOUR);
    }

    #[test]
    fn test_average_sleep_includes_naps() {
        // Day 1: 6h + 2h nap = 8h; day 2: 6h
        let records = vec![
            record("2024-01-01T23:00:00Z", "2024-01-02T05:00:00Z"),
            record("2024-01-01T14:00:00Z", "2024-01-01T16:00:00Z"),
            record("2024-01-02T23:00:00Z", "2024-01-03T05:00:00Z"),
        ];
        assert_eq!(CycleAnalyzer::average_sleep(&records), 7.0 * MS_PER_HOUR);
    }

    #[test]
    fn test_average_sleep_empty_is_nan() {
        assert!(CycleAnalyzer::average_sleep(&[]).is_nan());
    }

    #[test]
    fn test_average_sleep_windowed_and_full() {
        let store = RecordStore::new(vec![
            record("2024-01-01T23:00:00Z", "2024-01-02T09:00:00Z"),
            record("2024-01-02T23:00:00Z", "2024-01-03T05:00:00Z"),
            record("2024-01-03T23:00:00Z", "2024-01-04T07:00:00Z"),
        ]);
        let config = EngineConfig {
            max_entries: 2,
            ..EngineConfig::default()
        };
        // (10 + 6 + 8) / 3
        assert_eq!(
            CycleAnalyzer::average_sleep_per_day(&store, &config, false),
            8.0 * MS_PER_HOUR
        );
        // (6 + 8) / 2
        assert_eq!(
            CycleAnalyzer::average_sleep_per_day(&store, &config, true),
            7.0 * MS_PER_HOUR
        );
    }

    #[test]
    fn test_metrics_visible_drift_independent() {
        // +0m, +0m, then +60m: visible window of the last two days sees only +60m
        let store = RecordStore::new(vec![
            record("2024-01-01T22:00:00Z", "2024-01-02T06:00:00Z"),
            record("2024-01-02T22:00:00Z", "2024-01-03T06:00:00Z"),
            record("2024-01-03T22:00:00Z", "2024-01-04T06:00:00Z"),
            record("2024-01-04T23:00:00Z", "2024-01-05T07:00:00Z"),
        ]);
        let config = EngineConfig {
            max_entries: 2,
            ..EngineConfig::default()
        };
        let entries = DayGrouper::main_sleep_entries(store.records(), config.averaging_days);
        let total = DriftCalculator::drift(&entries);
        let metrics = CycleAnalyzer::metrics(&store, &config, &total);

        assert_eq!(metrics.total_drift_ms, 20.0 * MS_PER_MINUTE);
        assert_eq!(metrics.visible_drift_ms, MS_PER_HOUR);
        assert_eq!(metrics.cycle_length_days, 72);
        assert_eq!(metrics.avg_sleep_all_days_ms, 8.0 * MS_PER_HOUR);
        assert_eq!(metrics.avg_sleep_visible_days_ms, 8.0 * MS_PER_HOUR);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cycle_length_non_increasing(
                a in MIN_MEASURABLE_DRIFT_MS..(12.0 * MS_PER_HOUR),
                b in MIN_MEASURABLE_DRIFT_MS..(12.0 * MS_PER_HOUR),
            ) {
                let (small, large) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(CycleAnalyzer::cycle_length(small) >= CycleAnalyzer::cycle_length(large));
                prop_assert!(CycleAnalyzer::cycle_length(large) >= 2);
            }

            #[test]
            fn sub_minute_drift_is_zero(ms in -59_999.0f64..59_999.0) {
                prop_assert_eq!(CycleAnalyzer::cycle_length(ms), 0);
            }
        }
    }
}
