//! Drift calculation
//!
//! Measures how far sleep onset and wake time move from one main sleep to the
//! next. Each day-over-day difference is folded into (-12h, 12h] so that a
//! transition 23h50m later reads as 10 minutes earlier.

use crate::types::{DriftResult, SleepRecord, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE};
use tracing::{debug, warn};

/// Drift assumed when there are fewer than two main sleeps (+30 minutes)
pub const DEFAULT_DRIFT_MS: f64 = 30.0 * MS_PER_MINUTE;

/// Rating assumed when there are fewer than two main sleeps
pub const DEFAULT_AVG_RATING: f64 = 3.0;

/// Pairs further apart than this are logged as data gaps
const GAP_WARNING_MS: f64 = 36.0 * MS_PER_HOUR;

/// Computes average day-over-day drift over main-sleep entries
pub struct DriftCalculator;

impl DriftCalculator {
    /// Average sleep and wake drift over chronologically sorted main sleeps.
    ///
    /// Never fails: fewer than two entries yields the default of +30 minutes
    /// for both drifts and a rating of 3.
    pub fn drift(entries: &[SleepRecord]) -> DriftResult {
        if entries.len() < 2 {
            warn!(
                entries = entries.len(),
                "fewer than two main sleeps, using default drift"
            );
            return DriftResult {
                sleep_drift_ms: DEFAULT_DRIFT_MS,
                wake_drift_ms: DEFAULT_DRIFT_MS,
                avg_rating: DEFAULT_AVG_RATING,
            };
        }

        let mut sleep_total = 0.0;
        let mut wake_total = 0.0;
        for pair in entries.windows(2) {
            let raw_sleep = pair[1].sleep.millis_since(&pair[0].sleep);
            let raw_wake = pair[1].wake.millis_since(&pair[0].wake);

            if raw_sleep.abs() > GAP_WARNING_MS {
                debug!(
                    gap_hours = raw_sleep / MS_PER_HOUR,
                    "multi-day gap between main sleeps, folding to 24h remainder"
                );
            }

            sleep_total += Self::fold_day_ms(raw_sleep);
            wake_total += Self::fold_day_ms(raw_wake);
        }

        let pairs = (entries.len() - 1) as f64;
        let rating_total: f64 = entries.iter().map(|e| f64::from(e.rating)).sum();

        let result = DriftResult {
            sleep_drift_ms: sleep_total / pairs,
            wake_drift_ms: wake_total / pairs,
            avg_rating: rating_total / entries.len() as f64,
        };

        debug!(
            entries = entries.len(),
            sleep_drift_min = result.sleep_drift_ms / MS_PER_MINUTE,
            wake_drift_min = result.wake_drift_ms / MS_PER_MINUTE,
            "computed drift"
        );
        result
    }

    /// Fold a millisecond difference into (-12h, 12h].
    ///
    /// The value is first reduced to [0, 24h); anything above 12h then becomes
    /// the shorter backwards rotation. Exactly 12h stays positive.
    pub fn fold_day_ms(ms: f64) -> f64 {
        let wrapped = ((ms % MS_PER_DAY) + MS_PER_DAY) % MS_PER_DAY;
        if wrapped > MS_PER_DAY / 2.0 {
            wrapped - MS_PER_DAY
        } else {
            wrapped
        }
    }
}
