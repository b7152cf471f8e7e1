//! Event types produced by the synthesis engine.
//!
//! This module provides the output side of the engine:
//! - [`CalendarEvent`]: an immutable all-day event ready for serialization
//! - [`Alarm`]: a reminder with a time-of-day trigger relative to the event date
//! - [`EventCategory`]: the kind of occurrence (birthday, task, holiday, ...)
//! - [`DedupKey`]: the identity of a holiday occurrence across runs

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// The kind of occurrence an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Birthday,
    LunarBirthday,
    Anniversary,
    Task,
    /// Statutory holiday or workday adjustment.
    Holiday,
    /// Traditional festival or solar term.
    Festival,
}

impl EventCategory {
    /// Stable lowercase identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birthday => "birthday",
            Self::LunarBirthday => "lunar_birthday",
            Self::Anniversary => "anniversary",
            Self::Task => "task",
            Self::Holiday => "holiday",
            Self::Festival => "festival",
        }
    }

    /// Value written to the `CATEGORIES` property.
    pub fn ics_category(&self) -> &'static str {
        match self {
            Self::Birthday => "Birthday",
            Self::LunarBirthday => "Lunar Birthday",
            Self::Anniversary => "Anniversary",
            Self::Task => "Task",
            Self::Holiday => "Holiday",
            Self::Festival => "Festival",
        }
    }

    /// Whether alarms for this category use the localized holiday phrasing.
    pub fn is_holiday_stream(&self) -> bool {
        matches!(self, Self::Holiday | Self::Festival)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reminder attached to an all-day event.
///
/// The trigger is either a time of day on the event date itself, or a time of
/// day `days_before` days earlier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alarm {
    pub days_before: u32,
    pub time: NaiveTime,
    pub description: String,
}

impl Alarm {
    pub fn same_day(time: NaiveTime, description: impl Into<String>) -> Self {
        Self {
            days_before: 0,
            time,
            description: description.into(),
        }
    }

    pub fn days_before(days: u32, time: NaiveTime, description: impl Into<String>) -> Self {
        Self {
            days_before: days,
            time,
            description: description.into(),
        }
    }

    /// Offset of the trigger relative to midnight at the start of the event date.
    ///
    /// `09:00` on the day is `+9h`; `-2 09:00` is `-2d + 9h = -39h`.
    pub fn trigger_offset(&self) -> Duration {
        let since_midnight = Duration::seconds(i64::from(self.time.num_seconds_from_midnight()));
        since_midnight - Duration::days(i64::from(self.days_before))
    }

    /// The trigger rendered as an RFC 5545 duration (`PT9H`, `-P1DT15H`).
    pub fn trigger_string(&self) -> String {
        let offset = self.trigger_offset();
        let negative = offset < Duration::zero();
        let total = offset.num_seconds().unsigned_abs();

        let days = total / 86_400;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push('P');
        if days > 0 {
            out.push_str(&format!("{days}D"));
        }
        if hours > 0 || minutes > 0 || days == 0 {
            out.push('T');
            if hours > 0 || minutes == 0 {
                out.push_str(&format!("{hours}H"));
            }
            if minutes > 0 {
                out.push_str(&format!("{minutes}M"));
            }
        }
        out
    }
}

/// Identity of a holiday occurrence across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub summary: String,
}

impl DedupKey {
    pub fn new(date: NaiveDate, summary: impl Into<String>) -> Self {
        Self {
            date,
            summary: summary.into(),
        }
    }

    /// Canonical string used to derive a stable UID: `YYYYMMDD-summary`.
    pub fn as_uid_key(&self) -> String {
        format!("{}-{}", self.date.format("%Y%m%d"), self.summary)
    }
}

/// A fully assembled all-day calendar event.
///
/// Events carry only a date. Alarms are the sole place a time of day appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub start: NaiveDate,
    pub category: EventCategory,
    /// Extra `CATEGORIES` values (task list name, "Overdue").
    pub tags: Vec<String>,
    pub alarms: Vec<Alarm>,
}

impl CalendarEvent {
    pub fn new(
        uid: impl Into<String>,
        summary: impl Into<String>,
        start: NaiveDate,
        category: EventCategory,
    ) -> Self {
        Self {
            uid: uid.into(),
            summary: summary.into(),
            description: String::new(),
            start,
            category,
            tags: Vec::new(),
            alarms: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_alarms(mut self, alarms: Vec<Alarm>) -> Self {
        self.alarms = alarms;
        self
    }

    /// Always true: the model has no timed events.
    pub fn is_all_day(&self) -> bool {
        true
    }

    /// Exclusive end date of the all-day span.
    pub fn end(&self) -> NaiveDate {
        self.start.succ_opt().unwrap_or(self.start)
    }

}
