//! Intermediate records produced by the source normalizers.
//!
//! Records are created once per run from a fetch and consumed by the synthesis
//! step. They are plain data: no provider transport details survive here.

use chrono::NaiveDate;

/// The kind of date a contact record describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEventKind {
    Birthday,
    LunarBirthday,
    /// A named anniversary; `label` is the display name ("Wedding", "Anniversary").
    Anniversary { label: String },
}

impl ContactEventKind {
    /// Short key used when deriving stable identifiers.
    pub fn key(&self) -> &str {
        match self {
            Self::Birthday => "birthday",
            Self::LunarBirthday => "lunar_birthday",
            Self::Anniversary { .. } => "anniversary",
        }
    }
}

/// A single dated event attached to a contact.
///
/// For lunar birthdays `month`/`day` are lunar values. `year` is the origin
/// year when the source knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub name: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub kind: ContactEventKind,
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
}

impl ContactRecord {
    /// Name shown in descriptions: nickname when present, otherwise the full name.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

/// A task with its list context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub list_title: String,
    pub title: String,
    pub notes: Option<String>,
    pub completed: bool,
    pub due: Option<NaiveDate>,
    pub completed_on: Option<NaiveDate>,
    pub web_link: Option<String>,
    /// Titles of child tasks, in source order.
    pub subtasks: Vec<String>,
}

impl TaskRecord {
    /// Text scanned for recurrence hints: title followed by notes.
    pub fn recurrence_text(&self) -> String {
        match self.notes.as_deref() {
            Some(notes) if !notes.is_empty() => format!("{} {}", self.title, notes),
            _ => self.title.clone(),
        }
    }
}

/// Provider-supplied work-calendar marker on a holiday event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialDay {
    WorkHoliday,
    AlternateWorkday,
}

impl SpecialDay {
    /// Parses the `X-APPLE-SPECIAL-DAY` property value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "WORK-HOLIDAY" => Some(Self::WorkHoliday),
            "ALTERNATE-WORKDAY" => Some(Self::AlternateWorkday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkHoliday => "WORK-HOLIDAY",
            Self::AlternateWorkday => "ALTERNATE-WORKDAY",
        }
    }
}

/// One holiday feed entry, or one event read back from a prior output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRecord {
    pub date: NaiveDate,
    pub summary: String,
    pub special_day: Option<SpecialDay>,
}

impl HolidayRecord {
    pub fn new(date: NaiveDate, summary: impl Into<String>) -> Self {
        Self {
            date,
            summary: summary.into(),
            special_day: None,
        }
    }

    #[must_use]
    pub fn with_special_day(mut self, special_day: SpecialDay) -> Self {
        self.special_day = Some(special_day);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(nickname: Option<&str>) -> ContactRecord {
        ContactRecord {
            name: "Alice Liddell".into(),
            nickname: nickname.map(Into::into),
            phone: None,
            kind: ContactEventKind::Birthday,
            month: 5,
            day: 4,
            year: None,
        }
    }

    #[test]
    fn display_name_prefers_nickname() {
        assert_eq!(contact(Some("Ali")).display_name(), "Ali");
        assert_eq!(contact(None).display_name(), "Alice Liddell");
        assert_eq!(contact(Some("")).display_name(), "Alice Liddell");
    }

    #[test]
    fn recurrence_text_joins_title_and_notes() {
        let mut task = TaskRecord {
            id: "t1".into(),
            list_title: "Inbox".into(),
            title: "Water plants".into(),
            notes: Some("every 3 days".into()),
            completed: false,
            due: None,
            completed_on: None,
            web_link: None,
            subtasks: vec![],
        };
        assert_eq!(task.recurrence_text(), "Water plants every 3 days");
        task.notes = None;
        assert_eq!(task.recurrence_text(), "Water plants");
    }

    #[test]
    fn special_day_parse() {
        assert_eq!(SpecialDay::parse("WORK-HOLIDAY"), Some(SpecialDay::WorkHoliday));
        assert_eq!(
            SpecialDay::parse(" alternate-workday "),
            Some(SpecialDay::AlternateWorkday)
        );
        assert_eq!(SpecialDay::parse("OTHER"), None);
    }
}
