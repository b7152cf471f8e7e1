//! Holiday feed synthesis.
//!
//! Feed records are classified into statutory holidays and festivals, given
//! a canonical summary, and merged per stream with that stream's history.
//! UIDs derive from (date, summary) so a record read back from history maps
//! to the same event it was written as.

mod classify;
mod merge;

pub use classify::{Rule, classify, normalize_summary};
pub use merge::{HistoryMerger, IcsHistory, InMemoryHistory, PriorEventsProvider};

use calengine_core::{DedupKey, Diagnostics, EventCategory, HolidayRecord};

use crate::assemble::Occurrence;
use crate::error::SyncResult;
use crate::settings::HolidaySettings;

/// Records split by output stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayStreams {
    pub holidays: Vec<HolidayRecord>,
    pub festivals: Vec<HolidayRecord>,
}

impl HolidayStreams {
    pub fn len(&self) -> usize {
        self.holidays.len() + self.festivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct HolidaySynthesizer {
    settings: HolidaySettings,
}

impl HolidaySynthesizer {
    pub fn new(settings: HolidaySettings) -> Self {
        Self { settings }
    }

    /// Normalizes summaries and splits records into the two streams.
    pub fn split(&self, records: Vec<HolidayRecord>) -> HolidayStreams {
        let mut streams = HolidayStreams::default();
        for mut record in records {
            let category = classify(&record).category();
            record.summary = normalize_summary(&record.summary);
            match category {
                EventCategory::Holiday => streams.holidays.push(record),
                _ => streams.festivals.push(record),
            }
        }
        streams
    }

    /// Splits fresh records and merges each stream with its own history.
    pub fn synthesize(
        &self,
        records: Vec<HolidayRecord>,
        holiday_history: &dyn PriorEventsProvider,
        festival_history: &dyn PriorEventsProvider,
        diagnostics: &mut Diagnostics,
    ) -> SyncResult<HolidayStreams> {
        let fresh = self.split(records);
        let merger = HistoryMerger::new(self.settings.preserve_history);

        Ok(HolidayStreams {
            holidays: merger.merge(fresh.holidays, &Normalized(holiday_history), diagnostics)?,
            festivals: merger.merge(fresh.festivals, &Normalized(festival_history), diagnostics)?,
        })
    }

    /// Occurrences for one stream; `category` is the stream's category.
    pub fn occurrences(records: &[HolidayRecord], category: EventCategory) -> Vec<Occurrence> {
        records
            .iter()
            .map(|record| {
                let key = DedupKey::new(record.date, record.summary.clone()).as_uid_key();
                Occurrence::new(key, record.date, category, record.summary.clone())
            })
            .collect()
    }
}

/// History with summaries put in canonical form, so older files still dedup.
struct Normalized<'a>(&'a dyn PriorEventsProvider);

impl PriorEventsProvider for Normalized<'_> {
    fn prior_events(&self, diagnostics: &mut Diagnostics) -> SyncResult<Vec<HolidayRecord>> {
        let mut records = self.0.prior_events(diagnostics)?;
        for record in &mut records {
            record.summary = normalize_summary(&record.summary);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calengine_core::stable_uid;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn split_classifies_and_normalizes() {
        let streams = HolidaySynthesizer::default().split(vec![
            HolidayRecord::new(date(2025, 1, 29), "春节（休）"),
            HolidayRecord::new(date(2025, 2, 3), "立春"),
            HolidayRecord::new(date(2025, 4, 4), "清明"),
        ]);

        let holidays: Vec<&str> = streams.holidays.iter().map(|r| r.summary.as_str()).collect();
        let festivals: Vec<&str> = streams.festivals.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(holidays, vec!["春节 (休)", "清明节"]);
        assert_eq!(festivals, vec!["立春"]);
    }

    #[test]
    fn streams_merge_with_their_own_history() {
        let holiday_history = InMemoryHistory::new(vec![HolidayRecord::new(date(2024, 2, 10), "春节")]);
        let festival_history = InMemoryHistory::new(vec![HolidayRecord::new(date(2024, 2, 4), "立春")]);

        let streams = HolidaySynthesizer::default()
            .synthesize(
                vec![HolidayRecord::new(date(2025, 1, 29), "春节")],
                &holiday_history,
                &festival_history,
                &mut Diagnostics::new(),
            )
            .unwrap();

        assert_eq!(streams.holidays.len(), 2);
        assert_eq!(streams.festivals.len(), 1);
        assert_eq!(streams.festivals[0].date, date(2024, 2, 4));
    }

    #[test]
    fn unnormalized_history_dedups_against_fresh() {
        let history = InMemoryHistory::new(vec![HolidayRecord::new(date(2025, 4, 4), "清明")]);
        let streams = HolidaySynthesizer::default()
            .synthesize(
                vec![HolidayRecord::new(date(2025, 4, 4), "清明")],
                &history,
                &InMemoryHistory::default(),
                &mut Diagnostics::new(),
            )
            .unwrap();
        assert_eq!(streams.holidays.len(), 1);
    }

    #[test]
    fn occurrence_key_is_the_dedup_key() {
        let records = vec![HolidayRecord::new(date(2025, 1, 29), "春节")];
        let occurrences = HolidaySynthesizer::occurrences(&records, EventCategory::Holiday);
        assert_eq!(occurrences[0].key, "20250129-春节");
        assert_eq!(
            stable_uid(&occurrences[0].key, "holidays"),
            stable_uid(&DedupKey::new(date(2025, 1, 29), "春节").as_uid_key(), "holidays")
        );
    }
}
