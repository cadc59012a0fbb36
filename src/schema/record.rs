//! sleep_log.v1 record checks
//!
//! A record on the wire is `{ "sleep": ISO-8601, "wake": ISO-8601,
//! "rating": 1-5, "note": string }`. The engine accepts whatever it is given;
//! the checks here are an opt-in data-quality report for tools that want one.

use crate::types::{SleepRecord, MS_PER_MINUTE};
use thiserror::Error;

/// Current input schema version
pub const SCHEMA_VERSION: &str = "sleep_log.v1";

/// Lowest valid rating
pub const MIN_RATING: u8 = 1;
/// Highest valid rating
pub const MAX_RATING: u8 = 5;

/// Which timestamp of a record a finding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    Sleep,
    Wake,
}

impl TimestampField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampField::Sleep => "sleep",
            TimestampField::Wake => "wake",
        }
    }
}

/// Data-quality problems in a single record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unreadable {} timestamp", .0.as_str())]
    InvalidTimestamp(TimestampField),

    #[error("Rating {0} outside 1-5")]
    RatingOutOfRange(u8),

    #[error("Wake is not after sleep ({minutes:.0} minutes)")]
    WakeNotAfterSleep { minutes: f64 },
}

impl SleepRecord {
    /// Check a record against sleep_log.v1 expectations
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.sleep.is_valid() {
            return Err(ValidationError::InvalidTimestamp(TimestampField::Sleep));
        }
        if !self.wake.is_valid() {
            return Err(ValidationError::InvalidTimestamp(TimestampField::Wake));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }

        let duration = self.duration_ms();
        if duration <= 0.0 {
            return Err(ValidationError::WakeNotAfterSleep {
                minutes: duration / MS_PER_MINUTE,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;

    fn record(sleep: &str, wake: &str, rating: u8) -> SleepRecord {
        SleepRecord::new(Timestamp::parse(sleep), Timestamp::parse(wake), rating, "")
    }

    #[test]
    fn test_valid_record() {
        assert!(record("2024-01-01T23:00:00Z", "2024-01-02T07:00:00Z", 3)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_timestamps() {
        assert_eq!(
            record("nope", "2024-01-02T07:00:00Z", 3).validate(),
            Err(ValidationError::InvalidTimestamp(TimestampField::Sleep))
        );
        assert_eq!(
            record("2024-01-01T23:00:00Z", "", 3).validate(),
            Err(ValidationError::InvalidTimestamp(TimestampField::Wake))
        );
    }

    #[test]
    fn test_rating_range() {
        assert_eq!(
            record("2024-01-01T23:00:00Z", "2024-01-02T07:00:00Z", 0).validate(),
            Err(ValidationError::RatingOutOfRange(0))
        );
        assert_eq!(
            record("2024-01-01T23:00:00Z", "2024-01-02T07:00:00Z", 6).validate(),
            Err(ValidationError::RatingOutOfRange(6))
        );
    }

    #[test]
    fn test_wake_before_sleep() {
        let err = record("2024-01-02T07:00:00Z", "2024-01-01T23:00:00Z", 3)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::WakeNotAfterSleep { minutes: -480.0 });
        assert_eq!(err.to_string(), "Wake is not after sleep (-480 minutes)");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::InvalidTimestamp(TimestampField::Wake).to_string(),
            "Unreadable wake timestamp"
        );
        assert_eq!(
            ValidationError::RatingOutOfRange(9).to_string(),
            "Rating 9 outside 1-5"
        );
    }
}
