//! Day grouping
//!
//! Files every record under the calendar date of its `sleep` timestamp and
//! picks one main sleep per day. The remaining same-day records are naps and
//! take no part in drift or prediction math.

use crate::types::{DayGroup, SleepRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups records by day and selects main sleeps
pub struct DayGrouper;

impl DayGrouper {
    /// Group records by the date of `sleep`, oldest day first.
    ///
    /// Records whose `sleep` could not be read share one group with no date,
    /// which sorts before every dated group.
    pub fn group_by_day(records: &[SleepRecord]) -> Vec<DayGroup> {
        let mut by_date: BTreeMap<Option<NaiveDate>, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            by_date.entry(record.day()).or_default().push(index);
        }

        let groups: Vec<DayGroup> = by_date
            .into_iter()
            .filter_map(|(date, indices)| {
                let main = select_main(records, &indices)?;
                Some(DayGroup {
                    date,
                    indices,
                    main,
                })
            })
            .collect();

        debug!(
            records = records.len(),
            days = groups.len(),
            "grouped records by day"
        );
        groups
    }

    /// The main sleep of a group, looked up in the slice that was grouped
    pub fn main_sleep_of<'a>(
        group: &DayGroup,
        records: &'a [SleepRecord],
    ) -> Option<&'a SleepRecord> {
        records.get(group.main)
    }

    /// Each day's main sleep, oldest first, limited to the most recent
    /// `averaging_days` days when that is fewer than the days present.
    pub fn main_sleep_entries(
        records: &[SleepRecord],
        averaging_days: Option<usize>,
    ) -> Vec<SleepRecord> {
        let mut entries: Vec<SleepRecord> = Self::group_by_day(records)
            .iter()
            .filter_map(|group| Self::main_sleep_of(group, records))
            .cloned()
            .collect();

        if let Some(limit) = averaging_days {
            if limit < entries.len() {
                entries.drain(..entries.len() - limit);
            }
        }

        entries
    }

    /// Number of distinct `sleep` dates in the records
    pub fn distinct_days(records: &[SleepRecord]) -> usize {
        let mut dates: Vec<Option<NaiveDate>> = records.iter().map(SleepRecord::day).collect();
        dates.sort_unstable();
        dates.dedup();
        dates.len()
    }
}

/// Position of the longest record among `indices`; the first one wins ties.
///
/// A `NaN` duration ranks below every readable one, so it is only picked
/// when no record in the day has a readable duration.
fn select_main(records: &[SleepRecord], indices: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &index in indices {
        let Some(record) = records.get(index) else {
            continue;
        };
        let duration = record.duration_ms();
        match best {
            None => best = Some((index, duration)),
            Some((_, longest)) if is_longer(duration, longest) => {
                best = Some((index, duration))
            }
            Some(_) => {}
        }
    }
    best.map(|(index, _)| index)
}

fn is_longer(duration: f64, longest: f64) -> bool {
    if longest.is_nan() {
        !duration.is_nan()
    } else {
        duration > longest
    }
}
