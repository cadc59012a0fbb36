//! Reading sleep_log.v1 records
//!
//! Structural problems (malformed JSON, a missing `sleep` field) are errors.
//! Unreadable timestamp strings are not: they become invalid timestamps and
//! the engine carries them through as "no value".

use crate::error::ComputeError;
use crate::schema::record::ValidationError;
use crate::types::SleepRecord;
use tracing::warn;

/// Adapter for reading records at the engine boundary
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<SleepRecord>, ComputeError> {
        let records: Vec<SleepRecord> = serde_json::from_str(json)?;
        warn_unreadable(&records);
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON), one record per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<SleepRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<SleepRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        warn_unreadable(&records);
        Ok(records)
    }

    /// Serialize records back to a JSON array
    pub fn to_json(records: &[SleepRecord]) -> Result<String, ComputeError> {
        Ok(serde_json::to_string(records)?)
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[SleepRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record
                    .validate()
                    .err()
                    .map(|error| ValidationResult { index, error })
            })
            .collect()
    }
}

/// A failed record check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub error: ValidationError,
}

fn warn_unreadable(records: &[SleepRecord]) {
    let unreadable = records
        .iter()
        .filter(|r| !r.sleep.is_valid() || !r.wake.is_valid())
        .count();
    if unreadable > 0 {
        warn!(unreadable, "records with unreadable timestamps");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::record::TimestampField;
    use crate::timestamp::Timestamp;

    fn sample_json() -> &'static str {
        r#"[
            {"sleep": "2024-01-15T23:00:00.000Z", "wake": "2024-01-16T07:00:00.000Z", "rating": 4, "note": "ok"},
            {"sleep": "2024-01-16T23:30:00.000Z", "wake": "2024-01-17T07:15:00.000Z", "rating": 3, "note": ""}
        ]"#
    }

    #[test]
    fn test_parse_array() {
        let records = RecordAdapter::parse_array(sample_json()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].note, "ok");
        assert_eq!(records[1].sleep, Timestamp::parse("2024-01-16T23:30:00Z"));
    }

    #[test]
    fn test_parse_ndjson() {
        let ndjson = concat!(
            r#"{"sleep": "2024-01-15T23:00:00Z", "wake": "2024-01-16T07:00:00Z", "rating": 4, "note": ""}"#,
            "\n\n",
            r#"{"sleep": "2024-01-16T23:30:00Z", "wake": "2024-01-17T07:15:00Z", "rating": 3, "note": ""}"#,
            "\n"
        );
        let records = RecordAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_ndjson_reports_line() {
        let ndjson = "{\"sleep\": \"2024-01-15T23:00:00Z\", \"wake\": \"2024-01-16T07:00:00Z\"}\n{oops}\n";
        let err = RecordAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_unreadable_timestamp_is_not_an_error() {
        let records = RecordAdapter::parse_array(
            r#"[{"sleep": "31/02/2024 late", "wake": "2024-01-16T07:00:00Z", "rating": 3, "note": ""}]"#,
        )
        .unwrap();
        assert_eq!(records[0].sleep, Timestamp::Invalid);
    }

    #[test]
    fn test_missing_sleep_is_an_error() {
        let result = RecordAdapter::parse_array(r#"[{"wake": "2024-01-16T07:00:00Z"}]"#);
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(RecordAdapter::parse_array("not valid json").is_err());
    }

    #[test]
    fn test_validate_records() {
        let mut records = RecordAdapter::parse_array(sample_json()).unwrap();
        records.push(SleepRecord::new(
            Timestamp::Invalid,
            Timestamp::parse("2024-01-17T07:15:00Z"),
            3,
            "",
        ));
        let failures = RecordAdapter::validate_records(&records);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 2);
        assert_eq!(
            failures[0].error,
            ValidationError::InvalidTimestamp(TimestampField::Sleep)
        );
    }

    #[test]
    fn test_to_json_keeps_invalid_marker() {
        let records = vec![SleepRecord::new(
            Timestamp::Invalid,
            Timestamp::parse("2024-01-17T07:15:00Z"),
            3,
            "",
        )];
        let json = RecordAdapter::to_json(&records).unwrap();
        assert!(json.contains("Invalid Date"));
    }
}
