//! Core types for the n24-drift engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: ingested sleep records, day groups, drift results, cycle metrics and
//! predicted records. All durations are expressed in milliseconds as `f64`.

use crate::config::EngineConfig;
use crate::timestamp::Timestamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One minute in milliseconds
pub const MS_PER_MINUTE: f64 = 60_000.0;
/// One hour in milliseconds
pub const MS_PER_HOUR: f64 = 3_600_000.0;
/// One day in milliseconds
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Note attached to every predicted record
pub const PREDICTED_NOTE: &str = "Predicted";

fn default_rating() -> u8 {
    3
}

/// A single logged sleep interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    /// When the person fell asleep
    pub sleep: Timestamp,
    /// When the person woke up
    pub wake: Timestamp,
    /// Subjective quality, 1-5
    #[serde(default = "default_rating")]
    pub rating: u8,
    /// Free text
    #[serde(default)]
    pub note: String,
}

impl SleepRecord {
    pub fn new(sleep: Timestamp, wake: Timestamp, rating: u8, note: impl Into<String>) -> Self {
        Self {
            sleep,
            wake,
            rating,
            note: note.into(),
        }
    }

    /// True elapsed time asleep (`wake - sleep`), never a clock-face difference
    pub fn duration_ms(&self) -> f64 {
        self.wake.millis_since(&self.sleep)
    }

    /// Calendar day this record is filed under (the date of `sleep`)
    pub fn day(&self) -> Option<NaiveDate> {
        self.sleep.date()
    }
}

/// A synthetic record produced by the predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedRecord {
    #[serde(flatten)]
    pub record: SleepRecord,
    /// Always `true` for predictor output
    pub predicted: bool,
}

/// Classification of a record within its day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepKind {
    /// The longest sleep of the day
    Main,
    Nap,
}

/// Records sharing the calendar date of their `sleep` timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    /// Calendar date; `None` collects records whose `sleep` could not be read
    pub date: Option<NaiveDate>,
    /// Positions in the grouped slice, in insertion order
    pub indices: Vec<usize>,
    /// Position of the main sleep
    pub main: usize,
}

impl DayGroup {
    /// Main/nap classification for a record position, `None` if not in this day
    pub fn kind_of(&self, index: usize) -> Option<SleepKind> {
        if index == self.main {
            Some(SleepKind::Main)
        } else if self.indices.contains(&index) {
            Some(SleepKind::Nap)
        } else {
            None
        }
    }

    /// Positions of every record other than the main sleep
    pub fn naps(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied().filter(move |&i| i != self.main)
    }
}

/// Average day-over-day shift of sleep and wake times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    /// Mean sleep-onset drift per day, in (-12h, 12h]
    pub sleep_drift_ms: f64,
    /// Mean wake-time drift per day, in (-12h, 12h]
    pub wake_drift_ms: f64,
    /// Mean rating over all entries
    pub avg_rating: f64,
}

/// Free-running cycle figures for the current view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    /// Days for sleep onset to loop back to the same clock time; 0 = no measurable drift
    pub cycle_length_days: u32,
    /// Sleep drift per day over the whole dataset (averaging window applied)
    pub total_drift_ms: f64,
    /// Sleep drift per day over the visible records
    pub visible_drift_ms: f64,
    /// Average sleep per day with data, all records
    pub avg_sleep_all_days_ms: f64,
    /// Average sleep per day with data, visible records
    pub avg_sleep_visible_days_ms: f64,
}

/// Everything the engine derives for one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Visible records, oldest first
    pub records: Vec<SleepRecord>,
    /// Day groups of `records`, oldest first; indices point into `records`
    pub groups: Vec<DayGroup>,
    /// Drift over the main sleeps of the whole dataset
    pub drift: DriftResult,
    pub metrics: CycleMetrics,
    pub predictions: Vec<PredictedRecord>,
}

/// Producer metadata for encoded output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Record counts behind an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisCoverage {
    pub total_records: usize,
    pub visible_records: usize,
    pub distinct_days: usize,
    pub main_sleep_entries: usize,
    pub invalid_timestamps: usize,
}

/// Complete encoded analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub format_version: String,
    pub producer: Producer,
    pub computed_at_utc: String,
    pub config: EngineConfig,
    pub coverage: AnalysisCoverage,
    pub analysis: Analysis,
}
