//! Merging fresh holiday records with a stream's previous output.
//!
//! There is no separate cache: the previous output file is the history. A
//! record the feed stopped serving survives because it is read back from the
//! last file written for its stream.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use calengine_core::{DedupKey, Diagnostics, HolidayRecord};
use calengine_providers::{HolidayNormalizer, SourceNormalizer, parse_holiday_events};

use crate::error::{SyncError, SyncResult};

/// Supplies the records a stream emitted on its previous run.
pub trait PriorEventsProvider {
    fn prior_events(&self, diagnostics: &mut Diagnostics) -> SyncResult<Vec<HolidayRecord>>;
}

/// Reads history back from a previously written ICS file.
///
/// A missing file is an empty history. A file that exists but cannot be read
/// or parsed is an error, so the stream fails instead of overwriting it with
/// a shorter event set.
#[derive(Debug, Clone)]
pub struct IcsHistory {
    path: PathBuf,
}

impl IcsHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriorEventsProvider for IcsHistory {
    fn prior_events(&self, diagnostics: &mut Diagnostics) -> SyncResult<Vec<HolidayRecord>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No previous output, history is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(SyncError::io(&self.path, e)),
        };

        let raw = parse_holiday_events(&text).map_err(|e| SyncError::history(&self.path, e.message()))?;
        let records = HolidayNormalizer.normalize_all(&raw, diagnostics);
        debug!(path = %self.path.display(), count = records.len(), "Read history");
        Ok(records)
    }
}

/// History held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    records: Vec<HolidayRecord>,
}

impl InMemoryHistory {
    pub fn new(records: Vec<HolidayRecord>) -> Self {
        Self { records }
    }
}

impl PriorEventsProvider for InMemoryHistory {
    fn prior_events(&self, _diagnostics: &mut Diagnostics) -> SyncResult<Vec<HolidayRecord>> {
        Ok(self.records.clone())
    }
}

/// Union of fresh and prior records keyed by (date, summary).
#[derive(Debug, Clone, Copy)]
pub struct HistoryMerger {
    preserve_history: bool,
}

impl HistoryMerger {
    pub fn new(preserve_history: bool) -> Self {
        Self { preserve_history }
    }

    /// Returns the merged records in (date, summary) order.
    ///
    /// Fresh records take precedence on key collisions. With history
    /// preservation off the provider is never consulted.
    pub fn merge(
        &self,
        fresh: Vec<HolidayRecord>,
        prior: &dyn PriorEventsProvider,
        diagnostics: &mut Diagnostics,
    ) -> SyncResult<Vec<HolidayRecord>> {
        let mut merged: BTreeMap<DedupKey, HolidayRecord> = BTreeMap::new();
        for record in fresh {
            merged
                .entry(DedupKey::new(record.date, record.summary.clone()))
                .or_insert(record);
        }

        if !self.preserve_history {
            return Ok(merged.into_values().collect());
        }

        let fresh_count = merged.len();
        for record in prior.prior_events(diagnostics)? {
            merged
                .entry(DedupKey::new(record.date, record.summary.clone()))
                .or_insert(record);
        }

        let retained = merged.len() - fresh_count;
        if retained > 0 {
            debug!(retained, "Kept events no longer served by the feed");
        }
        Ok(merged.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calengine_core::SpecialDay;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summaries(records: &[HolidayRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| format!("{} {}", r.date, r.summary))
            .collect()
    }

    struct FailingHistory;

    impl PriorEventsProvider for FailingHistory {
        fn prior_events(&self, _: &mut Diagnostics) -> SyncResult<Vec<HolidayRecord>> {
            Err(SyncError::history("/nowhere.ics", "corrupt"))
        }
    }

    mod merger {
        use super::*;

        #[test]
        fn history_only_events_are_kept() {
            let prior = InMemoryHistory::new(vec![HolidayRecord::new(date(2024, 2, 10), "春节")]);
            let fresh = vec![HolidayRecord::new(date(2025, 1, 29), "春节")];

            let merged = HistoryMerger::new(true)
                .merge(fresh, &prior, &mut Diagnostics::new())
                .unwrap();
            assert_eq!(summaries(&merged), vec!["2024-02-10 春节", "2025-01-29 春节"]);
        }

        #[test]
        fn disabled_uses_fresh_only_and_skips_provider() {
            let fresh = vec![HolidayRecord::new(date(2025, 1, 29), "春节")];
            let merged = HistoryMerger::new(false)
                .merge(fresh, &FailingHistory, &mut Diagnostics::new())
                .unwrap();
            assert_eq!(summaries(&merged), vec!["2025-01-29 春节"]);
        }

        #[test]
        fn fresh_wins_on_collision() {
            let prior = InMemoryHistory::new(vec![HolidayRecord::new(date(2025, 1, 29), "春节")]);
            let fresh =
                vec![HolidayRecord::new(date(2025, 1, 29), "春节").with_special_day(SpecialDay::WorkHoliday)];

            let merged = HistoryMerger::new(true)
                .merge(fresh, &prior, &mut Diagnostics::new())
                .unwrap();
            assert_eq!(merged.len(), 1);
            assert_eq!(merged[0].special_day, Some(SpecialDay::WorkHoliday));
        }

        #[test]
        fn provider_errors_propagate() {
            let result = HistoryMerger::new(true).merge(Vec::new(), &FailingHistory, &mut Diagnostics::new());
            assert!(matches!(result, Err(SyncError::History { .. })));
        }
    }

    mod ics_history {
        use super::*;

        const PRIOR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Calendar Engine//Holidays//EN\r\n\
BEGIN:VEVENT\r\n\
UID:a@calendar-engine-holidays\r\n\
DTSTAMP:20240101T000000Z\r\n\
DTSTART;VALUE=DATE:20240210\r\n\
SUMMARY:春节\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        #[test]
        fn missing_file_is_empty() {
            let dir = tempfile::tempdir().unwrap();
            let history = IcsHistory::new(dir.path().join("absent.ics"));
            assert!(history.prior_events(&mut Diagnostics::new()).unwrap().is_empty());
        }

        #[test]
        fn reads_previous_output() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("holidays.ics");
            std::fs::write(&path, PRIOR).unwrap();

            let records = IcsHistory::new(&path).prior_events(&mut Diagnostics::new()).unwrap();
            assert_eq!(summaries(&records), vec!["2024-02-10 春节"]);
        }

        #[test]
        fn garbage_file_is_a_history_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("holidays.ics");
            std::fs::write(&path, "not a calendar").unwrap();

            let err = IcsHistory::new(&path)
                .prior_events(&mut Diagnostics::new())
                .unwrap_err();
            assert!(matches!(err, SyncError::History { .. }));
        }
    }
}
