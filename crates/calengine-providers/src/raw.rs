//! Provider-shaped records as returned by each source.
//!
//! Google types mirror the People API v1 and Tasks API v1 JSON payloads; only
//! the fields the normalizers read are declared. Everything is optional
//! because the APIs omit empty fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use calengine_core::SpecialDay;

/// A partial date from the People API. `year` is absent when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDate {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonNickname {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPhone {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub canonical_form: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBirthday {
    #[serde(default)]
    pub date: Option<ApiDate>,
}

/// A user-defined dated event on a contact (anniversary, lunar birthday).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonEvent {
    #[serde(default)]
    pub date: Option<ApiDate>,
    /// Free-text type; carries the event markers.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub formatted_type: Option<String>,
}

/// One contact from `people/me/connections`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerson {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub names: Vec<PersonName>,
    #[serde(default)]
    pub nicknames: Vec<PersonNickname>,
    #[serde(default)]
    pub phone_numbers: Vec<PersonPhone>,
    #[serde(default)]
    pub birthdays: Vec<PersonBirthday>,
    #[serde(default)]
    pub events: Vec<PersonEvent>,
}

impl RawPerson {
    /// Whether the contact carries anything the engine can turn into events.
    pub fn has_dates(&self) -> bool {
        !self.birthdays.is_empty() || !self.events.is_empty()
    }
}

/// One task from `lists/{id}/tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// "needsAction" or "completed".
    #[serde(default)]
    pub status: Option<String>,
    /// RFC 3339 timestamp; only the date part is meaningful.
    #[serde(default)]
    pub due: Option<String>,
    /// RFC 3339 completion timestamp.
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub deleted: Option<bool>,
}

impl RawTask {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

/// A task list together with all of its tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTaskList {
    pub id: String,
    pub title: String,
    pub tasks: Vec<RawTask>,
}

/// One VEVENT from a holiday feed, or from a previously written output file.
///
/// `date` and `summary` are absent when the VEVENT lacks them or they cannot
/// be read; the normalizer drops such entries with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHoliday {
    pub uid: Option<String>,
    pub date: Option<NaiveDate>,
    pub summary: Option<String>,
    /// The `X-APPLE-SPECIAL-DAY` marker when present.
    pub special_day: Option<SpecialDay>,
}
