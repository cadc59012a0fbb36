//! Analysis encoding
//!
//! This module wraps an [`Analysis`] in a self-describing payload with
//! producer metadata, the configuration it was computed with and record
//! counts. Values with no data (`NaN`) are written as JSON `null`.

use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::grouping::DayGrouper;
use crate::store::RecordStore;
use crate::types::{Analysis, AnalysisCoverage, AnalysisPayload, Producer};
use crate::{DRIFT_VERSION, PRODUCER_NAME};
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Current analysis payload format version
pub const FORMAT_VERSION: &str = "1.0.0";

/// Encoder for analysis payloads
pub struct AnalysisEncoder {
    instance_id: String,
}

impl Default for AnalysisEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an analysis of `store` under `config`
    pub fn encode(
        &self,
        store: &RecordStore,
        config: &EngineConfig,
        analysis: Analysis,
    ) -> AnalysisPayload {
        let producer = Producer {
            name: PRODUCER_NAME.to_string(),
            version: DRIFT_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        AnalysisPayload {
            format_version: FORMAT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            config: config.clone(),
            coverage: self.build_coverage(store, config),
            analysis,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        store: &RecordStore,
        config: &EngineConfig,
        analysis: Analysis,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(store, config, analysis);
        serde_json::to_string_pretty(&payload)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    fn build_coverage(&self, store: &RecordStore, config: &EngineConfig) -> AnalysisCoverage {
        let distinct_days = DayGrouper::distinct_days(store.records());
        let main_sleep_entries = match config.averaging_days {
            Some(limit) => distinct_days.min(limit),
            None => distinct_days,
        };

        AnalysisCoverage {
            total_records: store.len(),
            visible_records: store.visible(config.max_entries).len(),
            distinct_days,
            main_sleep_entries,
            invalid_timestamps: store.invalid_timestamp_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze;
    use crate::timestamp::Timestamp;
    use crate::types::SleepRecord;

    fn make_store() -> RecordStore {
        let records = (1..=4)
            .map(|d| {
                SleepRecord::new(
                    Timestamp::parse(&format!("2024-01-0{}T22:00:00Z", d)),
                    Timestamp::parse(&format!("2024-01-0{}T06:00:00Z", d + 1)),
                    4,
                    "",
                )
            })
            .chain(std::iter::once(SleepRecord::new(
                Timestamp::parse("2024-01-04T14:00:00Z"),
                Timestamp::parse("2024-01-04T15:00:00Z"),
                3,
                "nap",
            )))
            .collect();
        RecordStore::new(records)
    }

    #[test]
    fn test_encode_payload() {
        let store = make_store();
        let config = EngineConfig {
            max_entries: 3,
            averaging_days: Some(3),
            ..EngineConfig::default()
        };
        let encoder = AnalysisEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(&store, &config, analyze(&store, &config));

        assert_eq!(payload.format_version, FORMAT_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, DRIFT_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.config, config);

        assert_eq!(payload.coverage.total_records, 5);
        assert_eq!(payload.coverage.visible_records, 3);
        assert_eq!(payload.coverage.distinct_days, 4);
        assert_eq!(payload.coverage.main_sleep_entries, 3);
        assert_eq!(payload.coverage.invalid_timestamps, 0);
    }

    #[test]
    fn test_encode_to_json() {
        let store = make_store();
        let config = EngineConfig::default();
        let encoder = AnalysisEncoder::new();
        let json = encoder
            .encode_to_json(&store, &config, analyze(&store, &config))
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("computed_at_utc").is_some());
        assert!(parsed["analysis"]["drift"]["sleep_drift_ms"].is_number());
        assert_eq!(parsed["analysis"]["predictions"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_nan_written_as_null() {
        let store = RecordStore::default();
        let config = EngineConfig::default();
        let json = AnalysisEncoder::new()
            .encode_to_json(&store, &config, analyze(&store, &config))
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["analysis"]["metrics"]["avg_sleep_all_days_ms"].is_null());
    }
}
