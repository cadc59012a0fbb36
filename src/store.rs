//! Record store
//!
//! Holds the immutable list of sleep records handed over by the caller. The
//! store is the only state the engine keeps; everything else is derived on
//! each call.

use crate::error::ComputeError;
use crate::schema::RecordAdapter;
use crate::types::SleepRecord;

/// Ordered list of ingested sleep records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<SleepRecord>,
}

impl RecordStore {
    /// Wrap records in insertion order
    pub fn new(records: Vec<SleepRecord>) -> Self {
        Self { records }
    }

    /// Build a store from a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(Self::new(RecordAdapter::parse_array(json)?))
    }

    /// Build a store from newline-delimited JSON records
    pub fn from_ndjson(ndjson: &str) -> Result<Self, ComputeError> {
        Ok(Self::new(RecordAdapter::parse_ndjson(ndjson)?))
    }

    /// Records in insertion order
    pub fn records(&self) -> &[SleepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent `max_entries` records by `sleep` time, oldest first.
    ///
    /// `0` means every record. Records with equal `sleep` keep insertion order,
    /// and records with an unreadable `sleep` count as the oldest.
    pub fn visible(&self, max_entries: usize) -> Vec<SleepRecord> {
        let mut ordered: Vec<&SleepRecord> = self.records.iter().collect();
        ordered.sort_by_key(|r| r.sleep);

        let skip = if max_entries == 0 {
            0
        } else {
            ordered.len().saturating_sub(max_entries)
        };

        ordered.into_iter().skip(skip).cloned().collect()
    }

    /// Number of records with an unreadable `sleep` or `wake`
    pub fn invalid_timestamp_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.sleep.is_valid() || !r.wake.is_valid())
            .count()
    }
}

impl From<Vec<SleepRecord>> for RecordStore {
    fn from(records: Vec<SleepRecord>) -> Self {
        Self::new(records)
    }
}
