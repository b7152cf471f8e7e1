use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use calengine_core::{ContactEventKind, ContactRecord, Diagnostics};

use super::SourceNormalizer;
use crate::raw::{ApiDate, RawPerson};

const UNKNOWN_NAME: &str = "Unknown";
const DEFAULT_ANNIVERSARY_LABEL: &str = "Anniversary";

/// Text markers matched, case-insensitively, against a contact event's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMarkers {
    pub gregorian_birthday: String,
    pub lunar_birthday: String,
    pub anniversary: String,
}

impl Default for EventMarkers {
    fn default() -> Self {
        Self {
            gregorian_birthday: "gregorian-birthday".to_string(),
            lunar_birthday: "lunar-birthday".to_string(),
            anniversary: "anniversary".to_string(),
        }
    }
}

/// Turns People API contacts into birthday, lunar birthday and anniversary records.
#[derive(Debug, Clone)]
pub struct ContactNormalizer {
    markers: EventMarkers,
    anniversary_marker: Option<Regex>,
}

impl Default for ContactNormalizer {
    fn default() -> Self {
        Self::new(EventMarkers::default())
    }
}

impl ContactNormalizer {
    pub fn new(markers: EventMarkers) -> Self {
        let anniversary_marker = if markers.anniversary.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(&markers.anniversary))
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self {
            markers,
            anniversary_marker,
        }
    }

    pub fn markers(&self) -> &EventMarkers {
        &self.markers
    }

    /// Classifies an event type. Lunar wins over anniversary, which wins over
    /// an explicit Gregorian birthday.
    fn classify(&self, event_type: &str) -> Option<ContactEventKind> {
        let lowered = event_type.to_lowercase();
        let has = |marker: &str| !marker.is_empty() && lowered.contains(&marker.to_lowercase());

        if has(&self.markers.lunar_birthday) {
            Some(ContactEventKind::LunarBirthday)
        } else if has(&self.markers.anniversary) {
            Some(ContactEventKind::Anniversary {
                label: self.anniversary_label(event_type),
            })
        } else if has(&self.markers.gregorian_birthday) {
            Some(ContactEventKind::Birthday)
        } else {
            None
        }
    }

    /// "Wedding anniversary" -> "Wedding"; "#anniversary" -> "Anniversary".
    fn anniversary_label(&self, event_type: &str) -> String {
        let stripped = match self.anniversary_marker {
            Some(ref re) => re.replace_all(event_type, " ").into_owned(),
            None => event_type.to_string(),
        };

        stripped
            .replace('#', " ")
            .split_whitespace()
            .last()
            .map(String::from)
            .unwrap_or_else(|| DEFAULT_ANNIVERSARY_LABEL.to_string())
    }
}

/// Month and day from a People API date, if they form a plausible calendar day.
fn month_day(date: &ApiDate, lunar: bool) -> Option<(u32, u32)> {
    let (month, day) = (date.month?, date.day?);
    let valid = if lunar {
        (1..=12).contains(&month) && (1..=30).contains(&day)
    } else {
        // 2000 is a leap year, so Feb 29 passes.
        NaiveDate::from_ymd_opt(2000, month, day).is_some()
    };
    valid.then_some((month, day))
}

fn first_non_empty<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

impl SourceNormalizer for ContactNormalizer {
    type Raw = RawPerson;
    type Record = ContactRecord;

    fn normalize(&self, person: &RawPerson, diagnostics: &mut Diagnostics) -> Vec<ContactRecord> {
        if !person.has_dates() {
            return Vec::new();
        }

        let name = first_non_empty(person.names.first().map(|n| n.display_name.as_deref()))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let nickname = first_non_empty(person.nicknames.first().map(|n| n.value.as_deref()));
        let phone = person.phone_numbers.first().and_then(|p| {
            first_non_empty([p.canonical_form.as_deref(), p.value.as_deref()])
        });

        let record = |kind: ContactEventKind, (month, day): (u32, u32), year: Option<i32>| ContactRecord {
            name: name.clone(),
            nickname: nickname.clone(),
            phone: phone.clone(),
            kind,
            month,
            day,
            year,
        };

        let mut records = Vec::new();

        if let Some(birthday) = person.birthdays.first() {
            match birthday.date.as_ref().and_then(|d| month_day(d, false).map(|md| (md, d.year))) {
                Some((md, year)) => records.push(record(ContactEventKind::Birthday, md, year)),
                None => diagnostics.warn(&name, "birthday has no usable month and day, skipped"),
            }
        }

        for event in &person.events {
            let event_type = event.kind.as_deref().unwrap_or_default();
            let Some(kind) = self.classify(event_type) else {
                continue;
            };
            let lunar = kind == ContactEventKind::LunarBirthday;

            let Some((md, year)) = event
                .date
                .as_ref()
                .and_then(|d| month_day(d, lunar).map(|md| (md, d.year)))
            else {
                diagnostics.warn(
                    &name,
                    format!("event '{}' has no usable month and day, skipped", event_type),
                );
                continue;
            };

            let duplicate = records
                .iter()
                .any(|r| r.kind == kind && (r.month, r.day) == md);
            if duplicate {
                continue;
            }
            records.push(record(kind, md, year));
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(json: &str) -> RawPerson {
        serde_json::from_str(json).unwrap()
    }

    fn normalize(json: &str) -> (Vec<ContactRecord>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let records = ContactNormalizer::default().normalize(&person(json), &mut diagnostics);
        (records, diagnostics)
    }

    mod fields {
        use super::*;

        #[test]
        fn birthday_with_nickname_and_phone() {
            let (records, diagnostics) = normalize(
                r#"{
                "names": [{"displayName": "Alice Liddell"}],
                "nicknames": [{"value": "Ali"}],
                "phoneNumbers": [{"value": "138 0000 0000", "canonicalForm": "+8613800000000"}],
                "birthdays": [{"date": {"year": 1990, "month": 5, "day": 4}}]
            }"#,
            );

            assert!(diagnostics.is_empty());
            assert_eq!(
                records,
                vec![ContactRecord {
                    name: "Alice Liddell".into(),
                    nickname: Some("Ali".into()),
                    phone: Some("+8613800000000".into()),
                    kind: ContactEventKind::Birthday,
                    month: 5,
                    day: 4,
                    year: Some(1990),
                }]
            );
        }

        #[test]
        fn phone_falls_back_to_raw_value() {
            let (records, _) = normalize(
                r#"{
                "names": [{"displayName": "Bob"}],
                "phoneNumbers": [{"value": "555-0100"}],
                "birthdays": [{"date": {"month": 2, "day": 29}}]
            }"#,
            );
            assert_eq!(records[0].phone.as_deref(), Some("555-0100"));
            assert_eq!(records[0].year, None);
        }

        #[test]
        fn missing_name_is_unknown() {
            let (records, _) = normalize(r#"{"birthdays": [{"date": {"month": 1, "day": 1}}]}"#);
            assert_eq!(records[0].name, "Unknown");
        }
    }

    mod events {
        use super::*;

        #[test]
        fn lunar_birthday_and_anniversary() {
            let (records, _) = normalize(
                r#"{
                "names": [{"displayName": "Carol"}],
                "events": [
                    {"date": {"year": 1960, "month": 8, "day": 15}, "type": "Lunar-Birthday"},
                    {"date": {"year": 1985, "month": 10, "day": 1}, "type": "Wedding anniversary"},
                    {"date": {"month": 3, "day": 3}, "type": "graduation"}
                ]
            }"#,
            );

            assert_eq!(records.len(), 2);
            assert_eq!(records[0].kind, ContactEventKind::LunarBirthday);
            assert_eq!((records[0].month, records[0].day), (8, 15));
            assert_eq!(
                records[1].kind,
                ContactEventKind::Anniversary {
                    label: "Wedding".into()
                }
            );
        }

        #[test]
        fn anniversary_label_defaults() {
            let normalizer = ContactNormalizer::default();
            assert_eq!(normalizer.anniversary_label("#anniversary"), "Anniversary");
            assert_eq!(normalizer.anniversary_label("First Date #ANNIVERSARY"), "Date");
            assert_eq!(normalizer.anniversary_label("anniversary Engagement"), "Engagement");
        }

        #[test]
        fn lunar_marker_wins_over_anniversary() {
            let normalizer = ContactNormalizer::default();
            assert_eq!(
                normalizer.classify("lunar-birthday anniversary"),
                Some(ContactEventKind::LunarBirthday)
            );
        }

        #[test]
        fn gregorian_marker_duplicates_are_dropped() {
            let (records, _) = normalize(
                r#"{
                "names": [{"displayName": "Dan"}],
                "birthdays": [{"date": {"month": 7, "day": 9}}],
                "events": [
                    {"date": {"month": 7, "day": 9}, "type": "gregorian-birthday"},
                    {"date": {"month": 7, "day": 10}, "type": "gregorian-birthday"}
                ]
            }"#,
            );
            assert_eq!(records.len(), 2);
            assert_eq!(records[1].day, 10);
        }

        #[test]
        fn custom_markers() {
            let normalizer = ContactNormalizer::new(EventMarkers {
                gregorian_birthday: "公历生日".into(),
                lunar_birthday: "农历生日".into(),
                anniversary: "纪念日".into(),
            });
            assert_eq!(normalizer.classify("农历生日"), Some(ContactEventKind::LunarBirthday));
            assert_eq!(normalizer.classify("公历生日"), Some(ContactEventKind::Birthday));
            assert_eq!(normalizer.classify("lunar-birthday"), None);
        }
    }

    mod invalid {
        use super::*;

        #[test]
        fn contact_without_dates_is_silent() {
            let (records, diagnostics) = normalize(r#"{"names": [{"displayName": "Eve"}]}"#);
            assert!(records.is_empty());
            assert!(diagnostics.is_empty());
        }

        #[test]
        fn bad_dates_warn_and_skip() {
            let (records, diagnostics) = normalize(
                r#"{
                "names": [{"displayName": "Frank"}],
                "birthdays": [{"date": {"year": 1990}}],
                "events": [
                    {"date": {"month": 13, "day": 1}, "type": "anniversary"},
                    {"date": {"month": 2, "day": 31}, "type": "lunar-birthday"}
                ]
            }"#,
            );

            assert!(records.is_empty());
            assert_eq!(diagnostics.warning_count(), 3);
            assert!(diagnostics.entries()[0].to_string().starts_with("Frank: birthday"));
        }

        #[test]
        fn lunar_day_thirty_is_accepted() {
            let (records, diagnostics) = normalize(
                r#"{"events": [{"date": {"month": 12, "day": 30}, "type": "lunar-birthday"}]}"#,
            );
            assert_eq!(records.len(), 1);
            assert!(diagnostics.is_empty());
        }
    }
}
