//! Timestamps with their original UTC offset
//!
//! Sleep logs arrive as ISO-8601 strings. The engine does not validate them:
//! a string that cannot be read becomes [`Timestamp::Invalid`], whose
//! millisecond value is `NaN`, and that `NaN` flows through every downstream
//! computation instead of raising an error.
//!
//! The calendar date of a timestamp is always taken in the offset it was
//! written with, so `2024-03-01T23:30:00-05:00` belongs to March 1st even
//! though it is already March 2nd in UTC.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike,
    Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Text used for timestamps that could not be read
pub const INVALID_DATE: &str = "Invalid Date";

/// Largest distance from the epoch a timestamp may have (±100,000,000 days)
const MAX_EPOCH_MS: f64 = 8.64e15;

/// Formats accepted for timestamps written without an offset
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// A point in time, or the invalid sentinel.
///
/// Equality, ordering and hashing compare instants only. Two timestamps
/// written with different offsets can be equal yet report different
/// [`Timestamp::date`] values; group by `date()`, not by the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    /// Unreadable input; sorts before every valid timestamp
    Invalid,
    Valid(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Read a timestamp leniently. Never fails.
    ///
    /// Accepts RFC 3339 (`Z` or numeric offset, optional fraction), ISO-8601
    /// without an offset (read as `+00:00`) and bare `YYYY-MM-DD` dates
    /// (midnight `+00:00`). Anything else is [`Timestamp::Invalid`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Timestamp::Valid(dt);
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Self::from_naive_utc(naive);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Self::from_naive_utc(naive);
            }
        }

        Timestamp::Invalid
    }

    fn from_naive_utc(naive: NaiveDateTime) -> Self {
        Timestamp::Valid(DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)))
    }

    /// Build a timestamp from epoch milliseconds in the given offset
    pub fn from_millis(ms: f64, offset: FixedOffset) -> Self {
        if !ms.is_finite() || ms.abs() > MAX_EPOCH_MS {
            return Timestamp::Invalid;
        }
        match Utc.timestamp_millis_opt(ms.trunc() as i64).single() {
            Some(utc) => Timestamp::Valid(utc.with_timezone(&offset)),
            None => Timestamp::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::Valid(_))
    }

    /// Milliseconds since the Unix epoch; `NaN` when invalid
    pub fn millis(&self) -> f64 {
        match self {
            Timestamp::Valid(dt) => dt.timestamp_millis() as f64,
            Timestamp::Invalid => f64::NAN,
        }
    }

    /// Calendar date in the timestamp's own offset
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Timestamp::Valid(dt) => Some(dt.date_naive()),
            Timestamp::Invalid => None,
        }
    }

    /// Local hour and minute in the timestamp's own offset
    pub fn clock(&self) -> Option<(u32, u32)> {
        match self {
            Timestamp::Valid(dt) => Some((dt.hour(), dt.minute())),
            Timestamp::Invalid => None,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Timestamp::Valid(dt) => Some(*dt.offset()),
            Timestamp::Invalid => None,
        }
    }

    /// Shift by a number of milliseconds, truncated toward zero.
    ///
    /// A non-finite shift or a result outside the representable range yields
    /// [`Timestamp::Invalid`].
    pub fn offset_by_ms(&self, ms: f64) -> Self {
        let dt = match self {
            Timestamp::Valid(dt) => dt,
            Timestamp::Invalid => return Timestamp::Invalid,
        };
        if !ms.is_finite() || ms.abs() > MAX_EPOCH_MS {
            return Timestamp::Invalid;
        }
        dt.checked_add_signed(Duration::milliseconds(ms.trunc() as i64))
            .map_or(Timestamp::Invalid, Timestamp::Valid)
    }

    /// Keep this timestamp's local date, seconds and offset, but take hour
    /// and minute from `other`'s local clock.
    pub fn with_clock_of(&self, other: &Timestamp) -> Self {
        let (dt, (hour, minute)) = match (self, other.clock()) {
            (Timestamp::Valid(dt), Some(clock)) => (dt, clock),
            _ => return Timestamp::Invalid,
        };

        dt.naive_local()
            .with_hour(hour)
            .and_then(|naive| naive.with_minute(minute))
            .and_then(|naive| dt.offset().from_local_datetime(&naive).single())
            .map_or(Timestamp::Invalid, Timestamp::Valid)
    }

    /// Milliseconds from `earlier` to `self`; `NaN` if either is invalid
    pub fn millis_since(&self, earlier: &Timestamp) -> f64 {
        self.millis() - earlier.millis()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Valid(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Timestamp::Invalid => f.write_str(INVALID_DATE),
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::Valid(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Timestamp::parse(&s))
    }
}
