//! Contact events: birthdays, lunar birthdays and anniversaries.
//!
//! Each record is expanded over a window of years around the current one.
//! Lunar dates go through the lunar converter; a lunar day that does not
//! exist in a given lunar year moves to the last day of that month.

use chrono::{Datelike, NaiveDate};

use calengine_core::lunar::{self, LunarError};
use calengine_core::{ContactEventKind, ContactRecord, Diagnostics, EventCategory};

use crate::assemble::Occurrence;
use crate::settings::ContactSettings;

const DEFAULT_ANNIVERSARY_LABEL: &str = "Anniversary";

/// "1st", "2nd", "3rd", "4th", "11th", "22nd".
pub fn ordinal(n: i32) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Expands contact records into dated occurrences.
#[derive(Debug, Clone, Default)]
pub struct ContactSynthesizer {
    settings: ContactSettings,
}

impl ContactSynthesizer {
    pub fn new(settings: ContactSettings) -> Self {
        Self { settings }
    }

    /// Solar years covered for a run on `today`, inclusive.
    pub fn years(&self, today: NaiveDate) -> std::ops::RangeInclusive<i32> {
        let current = today.year();
        let past = i32::try_from(self.settings.years_past).unwrap_or(i32::MAX);
        let future = i32::try_from(self.settings.years_future).unwrap_or(i32::MAX);
        current.saturating_sub(past)..=current.saturating_add(future)
    }

    pub fn synthesize(
        &self,
        records: &[ContactRecord],
        today: NaiveDate,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Occurrence> {
        let mut out = Vec::new();
        for record in records {
            for year in self.years(today) {
                let occurrence = match record.kind {
                    ContactEventKind::Birthday => self.birthday(record, year, diagnostics),
                    ContactEventKind::LunarBirthday => {
                        match self.lunar_birthday(record, year, diagnostics) {
                            Ok(o) => o,
                            Err(LunarError::InvalidDate { .. }) => {
                                diagnostics.warn(
                                    &record.name,
                                    format!("invalid lunar date {}-{}, skipped", record.month, record.day),
                                );
                                break;
                            }
                            Err(e) => {
                                diagnostics.warn(&record.name, format!("lunar birthday in {}: {}", year, e));
                                None
                            }
                        }
                    }
                    ContactEventKind::Anniversary { ref label } => {
                        self.anniversary(record, label, year, diagnostics)
                    }
                };
                out.extend(occurrence);
            }
        }
        out
    }

    /// The solar date of a Gregorian month/day in `year`. Feb 29 falls back
    /// to Feb 28 outside leap years.
    fn solar_date(
        record: &ContactRecord,
        year: i32,
        diagnostics: &mut Diagnostics,
    ) -> Option<NaiveDate> {
        if let Some(date) = NaiveDate::from_ymd_opt(year, record.month, record.day) {
            return Some(date);
        }
        if (record.month, record.day) == (2, 29) {
            diagnostics.info(&record.name, format!("no Feb 29 in {}, using Feb 28", year));
            return NaiveDate::from_ymd_opt(year, 2, 28);
        }
        diagnostics.warn(
            &record.name,
            format!("{}-{} is not a valid date in {}, skipped", record.month, record.day, year),
        );
        None
    }

    /// Years since the origin year; `None` when unknown, `Some(n <= 0)` before it.
    fn count(record: &ContactRecord, year: i32) -> Option<i32> {
        record.year.map(|origin| year - origin)
    }

    fn birthday(
        &self,
        record: &ContactRecord,
        year: i32,
        diagnostics: &mut Diagnostics,
    ) -> Option<Occurrence> {
        let age = Self::count(record, year);
        if age.is_some_and(|a| a <= 0) {
            return None;
        }
        let date = Self::solar_date(record, year, diagnostics)?;
        let emoji = &self.settings.emoji.birthday;

        let (summary, description) = match age {
            Some(age) => (
                format!("{}'s {} Birthday {}", record.name, ordinal(age), emoji),
                format!("Today is {}'s {} birthday!", record.display_name(), ordinal(age)),
            ),
            None => (
                format!("{}'s Birthday {}", record.name, emoji),
                format!("Today is {}'s birthday!", record.display_name()),
            ),
        };

        let key = format!("{}-{}-gregorian-birthday", record.name, date.format("%Y-%m-%d"));
        Some(
            Occurrence::new(key, date, EventCategory::Birthday, summary)
                .with_description(with_phone(description, record)),
        )
    }

    fn lunar_birthday(
        &self,
        record: &ContactRecord,
        year: i32,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Occurrence>, LunarError> {
        let age = Self::count(record, year);
        if age.is_some_and(|a| a <= 0) {
            return Ok(None);
        }
        let Some(conversion) = lunar::solar_date_in_year(record.month, record.day, year)? else {
            return Ok(None);
        };
        if conversion.was_adjusted() {
            diagnostics.info(
                &record.name,
                format!(
                    "lunar {}-{} does not exist in lunar year {}, moved back {} day(s) to day {}",
                    record.month,
                    record.day,
                    conversion.lunar_year,
                    conversion.adjustment(),
                    conversion.resolved_day
                ),
            );
        }

        let date = conversion.solar;
        let emoji = &self.settings.emoji.birthday;
        let (summary, description) = match age {
            Some(age) => (
                format!("{}'s {} Lunar Birthday {}", record.name, ordinal(age), emoji),
                format!("Today is {}'s {} lunar birthday!", record.display_name(), ordinal(age)),
            ),
            None => (
                format!("{}'s Lunar Birthday {}", record.name, emoji),
                format!("Today is {}'s lunar birthday!", record.display_name()),
            ),
        };

        let key = format!("{}-{}-lunar-birthday", record.name, date.format("%Y-%m-%d"));
        Ok(Some(
            Occurrence::new(key, date, EventCategory::LunarBirthday, summary)
                .with_description(with_phone(description, record)),
        ))
    }

    fn anniversary(
        &self,
        record: &ContactRecord,
        label: &str,
        year: i32,
        diagnostics: &mut Diagnostics,
    ) -> Option<Occurrence> {
        let years = Self::count(record, year);
        if years.is_some_and(|n| n <= 0) {
            return None;
        }
        let date = Self::solar_date(record, year, diagnostics)?;
        let emoji = &self.settings.emoji.anniversary;

        // A bare "anniversary" marker names the contact instead.
        let subject = if label.is_empty() || label == DEFAULT_ANNIVERSARY_LABEL {
            record.name.as_str()
        } else {
            label
        };

        let (summary, description) = match years {
            Some(n) => (
                format!("{} {} Anniversary {}", subject, ordinal(n), emoji),
                format!("Today is the {} anniversary of {}!", ordinal(n), subject),
            ),
            None => (
                format!("{} Anniversary {}", subject, emoji),
                format!("Today is the anniversary of {}!", subject),
            ),
        };

        let key = format!(
            "{}-{}-anniversary-{}",
            record.name,
            date.format("%Y-%m-%d"),
            label
        );
        Some(Occurrence::new(key, date, EventCategory::Anniversary, summary).with_description(description))
    }
}

fn with_phone(description: String, record: &ContactRecord) -> String {
    match record.phone.as_deref() {
        Some(phone) => format!("{description}\nTel: {phone}"),
        None => description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(kind: ContactEventKind, month: u32, day: u32, year: Option<i32>) -> ContactRecord {
        ContactRecord {
            name: "Alice".into(),
            nickname: Some("Ali".into()),
            phone: Some("+8613800000000".into()),
            kind,
            month,
            day,
            year,
        }
    }

    fn synthesizer(past: u32, future: u32) -> ContactSynthesizer {
        ContactSynthesizer::new(ContactSettings {
            years_past: past,
            years_future: future,
            ..ContactSettings::default()
        })
    }

    #[test]
    fn ordinals() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 101, 111].map(ordinal).to_vec();
        assert_eq!(
            rendered,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "101st", "111th"]
        );
    }

    mod birthdays {
        use super::*;

        #[test]
        fn one_occurrence_per_year_with_age() {
            let mut diagnostics = Diagnostics::new();
            let out = synthesizer(1, 1).synthesize(
                &[record(ContactEventKind::Birthday, 5, 4, Some(1990))],
                date(2025, 6, 1),
                &mut diagnostics,
            );

            let dates: Vec<NaiveDate> = out.iter().map(|o| o.date).collect();
            assert_eq!(dates, vec![date(2024, 5, 4), date(2025, 5, 4), date(2026, 5, 4)]);
            assert_eq!(out[1].summary, "Alice's 35th Birthday 🎂");
            assert_eq!(out[1].description, "Today is Ali's 35th birthday!\nTel: +8613800000000");
            assert_eq!(out[1].key, "Alice-2025-05-04-gregorian-birthday");
            assert_eq!(out[1].category, EventCategory::Birthday);
            assert!(diagnostics.is_empty());
        }

        #[test]
        fn unknown_year_has_no_age() {
            let out = synthesizer(0, 0).synthesize(
                &[record(ContactEventKind::Birthday, 5, 4, None)],
                date(2025, 6, 1),
                &mut Diagnostics::new(),
            );
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].summary, "Alice's Birthday 🎂");
            assert!(out[0].description.starts_with("Today is Ali's birthday!"));
        }

        #[test]
        fn years_before_birth_are_skipped() {
            let out = synthesizer(3, 0).synthesize(
                &[record(ContactEventKind::Birthday, 1, 1, Some(2024))],
                date(2025, 6, 1),
                &mut Diagnostics::new(),
            );
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].summary, "Alice's 1st Birthday 🎂");
        }

        #[test]
        fn leap_day_falls_back_to_feb_28() {
            let mut diagnostics = Diagnostics::new();
            let out = synthesizer(1, 0).synthesize(
                &[record(ContactEventKind::Birthday, 2, 29, Some(2000))],
                date(2025, 6, 1),
                &mut diagnostics,
            );
            assert_eq!(out[0].date, date(2024, 2, 29));
            assert_eq!(out[1].date, date(2025, 2, 28));
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics.warning_count(), 0);
        }
    }

    mod lunar_birthdays {
        use super::*;

        #[test]
        fn converted_per_solar_year() {
            let out = synthesizer(0, 1).synthesize(
                &[record(ContactEventKind::LunarBirthday, 8, 15, Some(1990))],
                date(2024, 1, 10),
                &mut Diagnostics::new(),
            );

            let dates: Vec<NaiveDate> = out.iter().map(|o| o.date).collect();
            assert_eq!(dates, vec![date(2024, 9, 17), date(2025, 10, 6)]);
            assert_eq!(out[0].summary, "Alice's 34th Lunar Birthday 🎂");
            assert_eq!(out[0].key, "Alice-2024-09-17-lunar-birthday");
            assert_eq!(out[0].category, EventCategory::LunarBirthday);
        }

        #[test]
        fn missing_thirtieth_moves_back_with_info() {
            let mut diagnostics = Diagnostics::new();
            let out = synthesizer(0, 0).synthesize(
                &[record(ContactEventKind::LunarBirthday, 2, 30, None)],
                date(2025, 6, 1),
                &mut diagnostics,
            );

            assert_eq!(out.len(), 1);
            assert_eq!(out[0].date, date(2025, 3, 28));
            assert_eq!(diagnostics.len(), 1);
            assert!(diagnostics.entries()[0].message.contains("moved back 1 day(s)"));
        }

        #[test]
        fn deterministic_across_runs() {
            let records = [record(ContactEventKind::LunarBirthday, 12, 30, None)];
            let first = synthesizer(5, 5).synthesize(&records, date(2025, 6, 1), &mut Diagnostics::new());
            let second = synthesizer(5, 5).synthesize(&records, date(2025, 6, 1), &mut Diagnostics::new());
            assert_eq!(first, second);
        }

        #[test]
        fn out_of_range_years_warn() {
            let mut diagnostics = Diagnostics::new();
            let out = synthesizer(0, 0).synthesize(
                &[record(ContactEventKind::LunarBirthday, 1, 1, None)],
                date(2150, 6, 1),
                &mut diagnostics,
            );
            assert!(out.is_empty());
            assert_eq!(diagnostics.warning_count(), 1);
        }
    }

    mod anniversaries {
        use super::*;

        #[test]
        fn named_anniversary() {
            let out = synthesizer(0, 0).synthesize(
                &[record(
                    ContactEventKind::Anniversary { label: "Wedding".into() },
                    10,
                    1,
                    Some(2015),
                )],
                date(2025, 6, 1),
                &mut Diagnostics::new(),
            );

            assert_eq!(out[0].summary, "Wedding 10th Anniversary 💍");
            assert_eq!(out[0].description, "Today is the 10th anniversary of Wedding!");
            assert_eq!(out[0].key, "Alice-2025-10-01-anniversary-Wedding");
            assert_eq!(out[0].category, EventCategory::Anniversary);
        }

        #[test]
        fn default_label_uses_contact_name() {
            let out = synthesizer(0, 0).synthesize(
                &[record(
                    ContactEventKind::Anniversary { label: "Anniversary".into() },
                    10,
                    1,
                    None,
                )],
                date(2025, 6, 1),
                &mut Diagnostics::new(),
            );
            assert_eq!(out[0].summary, "Alice Anniversary 💍");
        }
    }
}
