//! Sleep window prediction
//!
//! Projects future sleep windows from the last real main sleep. Each step
//! anchors one day after the previous predicted wake, resets the clock to
//! the last real sleep onset, then adds the drift once per step taken so far.
//! Predicted sleep onset is derived backwards from the average sleep length.

use crate::timestamp::Timestamp;
use crate::types::{DriftResult, PredictedRecord, SleepRecord, MS_PER_DAY, PREDICTED_NOTE};
use tracing::debug;

/// Rating used when the average rating is not a number
const FALLBACK_RATING: u8 = 3;

/// Extrapolates future sleep windows
pub struct Predictor;

impl Predictor {
    /// Predict `days` future records.
    ///
    /// `entries` are the chronologically sorted main sleeps; the last one
    /// supplies the clock time that is drifted forward. Returns an empty list
    /// when `days` is 0 or there are no entries. The result depends only on
    /// the arguments.
    pub fn predict(
        entries: &[SleepRecord],
        avg_sleep_ms: f64,
        drift: &DriftResult,
        last_wake: Timestamp,
        days: usize,
    ) -> Vec<PredictedRecord> {
        let Some(seed) = entries.last() else {
            return Vec::new();
        };

        let predictions: Vec<PredictedRecord> = (0..days)
            .scan(last_wake, |prev_wake, step| {
                let predicted = Self::step(prev_wake, &seed.sleep, drift, step, avg_sleep_ms);
                *prev_wake = predicted.record.wake;
                Some(predicted)
            })
            .collect();

        debug!(days = predictions.len(), "predicted sleep windows");
        predictions
    }

    /// One prediction step.
    ///
    /// The wake time lands on `seed`'s clock time plus `step + 1` drifts, on
    /// the day after `prev_wake`; sleep onset is `avg_sleep_ms` earlier.
    pub fn step(
        prev_wake: &Timestamp,
        seed: &Timestamp,
        drift: &DriftResult,
        step: usize,
        avg_sleep_ms: f64,
    ) -> PredictedRecord {
        let anchor = prev_wake.offset_by_ms(MS_PER_DAY).with_clock_of(seed);
        let wake = anchor.offset_by_ms(drift.sleep_drift_ms * (step + 1) as f64);
        let sleep = wake.offset_by_ms(-avg_sleep_ms);

        PredictedRecord {
            record: SleepRecord::new(sleep, wake, predicted_rating(drift.avg_rating), PREDICTED_NOTE),
            predicted: true,
        }
    }
}

fn predicted_rating(avg_rating: f64) -> u8 {
    if avg_rating.is_finite() {
        avg_rating.round().clamp(1.0, 5.0) as u8
    } else {
        FALLBACK_RATING
    }
}
