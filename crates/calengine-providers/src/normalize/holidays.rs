use calengine_core::{Diagnostics, HolidayRecord};

use super::SourceNormalizer;
use crate::raw::RawHoliday;

/// Keeps feed events that have both a start date and a summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct HolidayNormalizer;

impl SourceNormalizer for HolidayNormalizer {
    type Raw = RawHoliday;
    type Record = HolidayRecord;

    fn normalize(&self, raw: &RawHoliday, diagnostics: &mut Diagnostics) -> Vec<HolidayRecord> {
        let subject = raw
            .summary
            .as_deref()
            .or(raw.uid.as_deref())
            .unwrap_or("holiday");

        let (Some(date), Some(summary)) = (raw.date, raw.summary.as_deref()) else {
            let missing = if raw.date.is_none() { "start date" } else { "summary" };
            diagnostics.warn(subject, format!("event has no {}, skipped", missing));
            return Vec::new();
        };

        let mut record = HolidayRecord::new(date, summary);
        if let Some(special_day) = raw.special_day {
            record = record.with_special_day(special_day);
        }
        vec![record]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calengine_core::SpecialDay;
    use chrono::NaiveDate;

    #[test]
    fn complete_event_is_kept_with_marker() {
        let raw = RawHoliday {
            date: NaiveDate::from_ymd_opt(2025, 1, 29),
            summary: Some("春节".into()),
            special_day: Some(SpecialDay::WorkHoliday),
            ..RawHoliday::default()
        };

        let records = HolidayNormalizer.normalize(&raw, &mut Diagnostics::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, "春节");
        assert_eq!(records[0].special_day, Some(SpecialDay::WorkHoliday));
    }

    #[test]
    fn incomplete_events_warn() {
        let no_date = RawHoliday {
            uid: Some("u1".into()),
            summary: Some("无日期".into()),
            ..RawHoliday::default()
        };
        let no_summary = RawHoliday {
            uid: Some("u2".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..RawHoliday::default()
        };

        let mut diagnostics = Diagnostics::new();
        let records = HolidayNormalizer.normalize_all(&[no_date, no_summary], &mut diagnostics);

        assert!(records.is_empty());
        let messages: Vec<String> = diagnostics.entries().iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "无日期: event has no start date, skipped".to_string(),
                "u2: event has no summary, skipped".to_string(),
            ]
        );
    }
}
