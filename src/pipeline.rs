//! Pipeline orchestration
//!
//! This module provides the public API for n24-drift. It runs the stages in
//! order for one configuration:
//!
//! 1. RecordStore - visible window of the ingested records
//! 2. DayGrouper - day groups and main-sleep entries
//! 3. DriftCalculator - day-over-day drift
//! 4. CycleAnalyzer - cycle length and sleep averages
//! 5. Predictor - future sleep windows
//!
//! Nothing is cached between calls; every call derives everything again.

use crate::config::{EngineConfig, MAX_PREDICTION_DAYS};
use crate::cycle::CycleAnalyzer;
use crate::drift::DriftCalculator;
use crate::encoder::AnalysisEncoder;
use crate::error::ComputeError;
use crate::grouping::DayGrouper;
use crate::predictor::Predictor;
use crate::store::RecordStore;
use crate::types::{Analysis, PredictedRecord};
use tracing::debug;

/// Run every stage for one configuration.
///
/// The configuration is not validated here; predictions are capped at
/// [`MAX_PREDICTION_DAYS`] regardless.
pub fn analyze(store: &RecordStore, config: &EngineConfig) -> Analysis {
    let visible = store.visible(config.max_entries);
    let groups = DayGrouper::group_by_day(&visible);

    let entries = DayGrouper::main_sleep_entries(store.records(), config.averaging_days);
    let drift = DriftCalculator::drift(&entries);
    let metrics = CycleAnalyzer::metrics(store, config, &drift);

    let predictions = match entries.last() {
        Some(last) => Predictor::predict(
            &entries,
            metrics.avg_sleep_all_days_ms,
            &drift,
            last.wake,
            config.effective_prediction_days().min(MAX_PREDICTION_DAYS),
        ),
        None => Vec::new(),
    };

    debug!(
        records = store.len(),
        visible = visible.len(),
        main_sleeps = entries.len(),
        predictions = predictions.len(),
        "analysis complete"
    );

    Analysis {
        records: visible,
        groups,
        drift,
        metrics,
        predictions,
    }
}

/// Only the predicted records for one configuration
pub fn predict(store: &RecordStore, config: &EngineConfig) -> Vec<PredictedRecord> {
    analyze(store, config).predictions
}

/// Convert a JSON array of records into an encoded analysis payload.
///
/// # Arguments
/// * `records_json` - JSON array of `{sleep, wake, rating, note}` records
/// * `config_json` - Engine configuration JSON; `None` uses the defaults
///
/// # Example
/// ```ignore
/// let payload = analyze_json(records_json, Some(r#"{"prediction_days": 14}"#))?;
/// ```
pub fn analyze_json(records_json: &str, config_json: Option<&str>) -> Result<String, ComputeError> {
    let store = RecordStore::from_json(records_json)?;
    let config = load_config(config_json)?;
    let analysis = analyze(&store, &config);
    AnalysisEncoder::new().encode_to_json(&store, &config, analysis)
}

/// Convert a JSON array of records into a JSON array of predicted records
pub fn predict_json(records_json: &str, config_json: Option<&str>) -> Result<String, ComputeError> {
    let store = RecordStore::from_json(records_json)?;
    let config = load_config(config_json)?;
    serde_json::to_string(&predict(&store, &config))
        .map_err(|e| ComputeError::EncodingError(e.to_string()))
}

fn load_config(config_json: Option<&str>) -> Result<EngineConfig, ComputeError> {
    match config_json {
        Some(json) if !json.trim().is_empty() => EngineConfig::from_json(json),
        _ => Ok(EngineConfig::default()),
    }
}

/// Holds a record store and answers analyses for any configuration.
///
/// Only the records are kept; each call recomputes from them, so switching
/// configuration never returns stale results.
pub struct DriftProcessor {
    store: RecordStore,
    encoder: AnalysisEncoder,
}

impl DriftProcessor {
    /// Create a processor over the given records
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            encoder: AnalysisEncoder::new(),
        }
    }

    /// Create a processor from a JSON array of records
    pub fn from_json(records_json: &str) -> Result<Self, ComputeError> {
        Ok(Self::new(RecordStore::from_json(records_json)?))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Analyze the held records under `config`
    pub fn analyze(&self, config: &EngineConfig) -> Analysis {
        analyze(&self.store, config)
    }

    /// Analyze and encode to JSON
    pub fn analyze_to_json(&self, config: &EngineConfig) -> Result<String, ComputeError> {
        config.validate()?;
        self.encoder
            .encode_to_json(&self.store, config, self.analyze(config))
    }
}
