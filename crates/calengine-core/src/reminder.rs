//! Reminder specifications and per-category alarm scheduling.
//!
//! A reminder spec is either `"HH:MM"` (same day) or `"-N HH:MM"` (N days
//! before). Specs are parsed once at startup; a bad spec is a configuration
//! error, never a per-event failure.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::event::{Alarm, EventCategory};

/// Errors that can occur when parsing a reminder spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderParseError {
    #[error("empty reminder spec")]
    Empty,

    #[error("invalid reminder spec '{0}': expected \"HH:MM\" or \"-N HH:MM\"")]
    InvalidFormat(String),

    #[error("invalid time of day in reminder spec '{0}'")]
    InvalidTime(String),

    #[error("invalid day offset in reminder spec '{0}'")]
    InvalidDays(String),
}

/// A parsed reminder: a time of day, optionally some days before the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderSpec {
    pub days_before: u32,
    pub time: NaiveTime,
}

impl ReminderSpec {
    /// Builds the alarm for an event with the given description.
    pub fn to_alarm(&self, description: impl Into<String>) -> Alarm {
        Alarm::days_before(self.days_before, self.time, description)
    }

    /// Parses every spec in `specs`, failing on the first invalid one.
    pub fn parse_all<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Self>, ReminderParseError> {
        specs.iter().map(|s| s.as_ref().parse()).collect()
    }
}

fn parse_time(raw: &str, spec: &str) -> Result<NaiveTime, ReminderParseError> {
    let (hours, minutes) = raw
        .split_once(':')
        .ok_or_else(|| ReminderParseError::InvalidFormat(spec.to_string()))?;

    let valid_part = |p: &str| !p.is_empty() && p.len() <= 2 && p.bytes().all(|b| b.is_ascii_digit());
    if !valid_part(hours) || minutes.len() != 2 || !valid_part(minutes) {
        return Err(ReminderParseError::InvalidTime(spec.to_string()));
    }

    let hours: u32 = hours
        .parse()
        .map_err(|_| ReminderParseError::InvalidTime(spec.to_string()))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| ReminderParseError::InvalidTime(spec.to_string()))?;

    NaiveTime::from_hms_opt(hours, minutes, 0)
        .ok_or_else(|| ReminderParseError::InvalidTime(spec.to_string()))
}

impl FromStr for ReminderSpec {
    type Err = ReminderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        if spec.is_empty() {
            return Err(ReminderParseError::Empty);
        }

        let mut parts = spec.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(time), None, None) => Ok(Self {
                days_before: 0,
                time: parse_time(time, spec)?,
            }),
            (Some(days), Some(time), None) => {
                let digits = days
                    .strip_prefix('-')
                    .ok_or_else(|| ReminderParseError::InvalidDays(spec.to_string()))?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ReminderParseError::InvalidDays(spec.to_string()));
                }
                let days_before = digits
                    .parse()
                    .map_err(|_| ReminderParseError::InvalidDays(spec.to_string()))?;
                Ok(Self {
                    days_before,
                    time: parse_time(time, spec)?,
                })
            }
            _ => Err(ReminderParseError::InvalidFormat(spec.to_string())),
        }
    }
}

impl fmt::Display for ReminderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days_before > 0 {
            write!(f, "-{} ", self.days_before)?;
        }
        write!(f, "{:02}:{:02}", self.time.hour(), self.time.minute())
    }
}

/// Reminder specs per event category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderTable {
    specs: BTreeMap<EventCategory, Vec<ReminderSpec>>,
}

impl ReminderTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, category: EventCategory, specs: Vec<ReminderSpec>) -> Self {
        self.specs.insert(category, specs);
        self
    }

    pub fn specs(&self, category: EventCategory) -> &[ReminderSpec] {
        self.specs.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// The concrete alarms for an event, in configured order.
    ///
    /// Holiday and festival alarms use the localized phrasing
    /// ("今天是X", "明天是X", "N天后是X"); everything else reads "Reminder: X".
    pub fn alarms_for(&self, category: EventCategory, summary: &str) -> Vec<Alarm> {
        self.specs(category)
            .iter()
            .map(|spec| spec.to_alarm(alarm_description(category, spec.days_before, summary)))
            .collect()
    }
}

fn alarm_description(category: EventCategory, days_before: u32, summary: &str) -> String {
    if !category.is_holiday_stream() {
        return format!("Reminder: {summary}");
    }
    match days_before {
        0 => format!("今天是{summary}"),
        1 => format!("明天是{summary}"),
        n => format!("{n}天后是{summary}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    mod parse {
        use super::*;

        #[test]
        fn same_day() {
            let spec: ReminderSpec = "09:00".parse().unwrap();
            assert_eq!(spec, ReminderSpec { days_before: 0, time: time(9, 0) });
            let spec: ReminderSpec = "7:05".parse().unwrap();
            assert_eq!(spec.time, time(7, 5));
        }

        #[test]
        fn days_before() {
            let spec: ReminderSpec = "-2 09:00".parse().unwrap();
            assert_eq!(spec, ReminderSpec { days_before: 2, time: time(9, 0) });
            let spec: ReminderSpec = "  -14   19:30 ".parse().unwrap();
            assert_eq!(spec, ReminderSpec { days_before: 14, time: time(19, 30) });
        }

        #[test]
        fn errors() {
            assert_eq!("".parse::<ReminderSpec>(), Err(ReminderParseError::Empty));
            assert!(matches!("9am".parse::<ReminderSpec>(), Err(ReminderParseError::InvalidFormat(_))));
            assert!(matches!("25:00".parse::<ReminderSpec>(), Err(ReminderParseError::InvalidTime(_))));
            assert!(matches!("09:7".parse::<ReminderSpec>(), Err(ReminderParseError::InvalidTime(_))));
            assert!(matches!("2 09:00".parse::<ReminderSpec>(), Err(ReminderParseError::InvalidDays(_))));
            assert!(matches!("-x 09:00".parse::<ReminderSpec>(), Err(ReminderParseError::InvalidDays(_))));
            assert!(matches!("-1 09:00 extra".parse::<ReminderSpec>(), Err(ReminderParseError::InvalidFormat(_))));
        }

        #[test]
        fn parse_all_stops_at_first_error() {
            assert_eq!(ReminderSpec::parse_all(&["09:00", "-1 19:00"]).unwrap().len(), 2);
            assert!(ReminderSpec::parse_all(&["09:00", "bogus"]).is_err());
        }

        #[test]
        fn display_roundtrips() {
            for raw in ["09:00", "-2 09:00", "-14 19:30"] {
                let spec: ReminderSpec = raw.parse().unwrap();
                assert_eq!(spec.to_string(), raw);
            }
        }
    }

    mod table {
        use super::*;

        fn table() -> ReminderTable {
            ReminderTable::new()
                .with(
                    EventCategory::Holiday,
                    ReminderSpec::parse_all(&["-2 09:00", "-1 09:00", "09:00"]).unwrap(),
                )
                .with(
                    EventCategory::Birthday,
                    ReminderSpec::parse_all(&["09:00", "19:00"]).unwrap(),
                )
        }

        #[test]
        fn holiday_descriptions_are_localized() {
            let alarms = table().alarms_for(EventCategory::Holiday, "国庆节");
            let descriptions: Vec<_> = alarms.iter().map(|a| a.description.as_str()).collect();
            insta::assert_debug_snapshot!(descriptions, @r#"
            [
                "2天后是国庆节",
                "明天是国庆节",
                "今天是国庆节",
            ]
            "#);
        }

        #[test]
        fn triggers_follow_spec_order() {
            let triggers: Vec<_> = table()
                .alarms_for(EventCategory::Holiday, "x")
                .iter()
                .map(Alarm::trigger_string)
                .collect();
            insta::assert_snapshot!(triggers.join(" "), @"-P1DT15H -PT15H PT9H");
        }

        #[test]
        fn other_categories_use_plain_reminder() {
            let alarms = table().alarms_for(EventCategory::Birthday, "Alice's Birthday");
            assert_eq!(alarms.len(), 2);
            assert_eq!(alarms[0].description, "Reminder: Alice's Birthday");
            assert_eq!(alarms[1].time, time(19, 0));
        }

        #[test]
        fn unconfigured_category_has_no_alarms() {
            assert!(table().alarms_for(EventCategory::Task, "x").is_empty());
        }
    }
}
