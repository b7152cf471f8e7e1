//! Engine configuration.
//!
//! All settings live in a single `config.toml`, at
//! `~/.config/calengine/config.toml` by default. Every section has defaults,
//! so an empty file is a valid configuration.
//!
//! [`EngineConfig::validate`] turns the file into [`SyncSettings`] once at
//! startup: reminder specs are parsed, the timezone is resolved and the retry
//! policy is checked. Nothing is fetched before validation succeeds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use calengine_core::{EventCategory, ReminderSpec, ReminderTable};
use calengine_providers::{DEFAULT_HOLIDAY_FEED_URL, EventMarkers, RetryPolicy};
use calengine_sync::{
    ContactEmoji, ContactSettings, HolidayFile, HolidaySettings, TaskEmoji, TaskSettings,
};

use crate::error::{CliError, CliResult};

// ---------------------------------------------------------------------------
// EngineConfig (config.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub google_api: GoogleApiSettings,
    pub sync: SyncSection,
    pub holidays: HolidaysSection,
    pub ics: IcsSection,
    pub logging: LoggingSettings,
}

/// Google API access shared by the contacts and tasks streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleApiSettings {
    /// OAuth client file used by the login tool. Not read by the engine.
    pub credentials_file: Option<PathBuf>,
    pub http_timeout_seconds: u64,
    pub retry: RetrySettings,
    pub contacts: GoogleStreamSettings,
    pub tasks: GoogleStreamSettings,
}

impl Default for GoogleApiSettings {
    fn default() -> Self {
        Self {
            credentials_file: None,
            http_timeout_seconds: 120,
            retry: RetrySettings::default(),
            contacts: GoogleStreamSettings::default(),
            tasks: GoogleStreamSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub min_wait_seconds: u64,
    pub max_wait_seconds: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_wait_seconds: 4,
            max_wait_seconds: 60,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleStreamSettings {
    pub enabled: bool,
    /// Authorized-user token file. Defaults to the data directory.
    pub token_file: Option<PathBuf>,
}

impl Default for GoogleStreamSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// IANA timezone that decides what "today" is.
    pub timezone: String,
    pub contacts: ContactsSyncSettings,
    pub tasks: TasksSyncSettings,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            contacts: ContactsSyncSettings::default(),
            tasks: TasksSyncSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsSyncSettings {
    pub years_past: u32,
    pub years_future: u32,
}

impl Default for ContactsSyncSettings {
    fn default() -> Self {
        Self {
            years_past: 5,
            years_future: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksSyncSettings {
    pub include_completed: bool,
    pub include_without_due: bool,
    pub overdue_show_today: bool,
    pub repeat_past_instances_days: u32,
    pub repeat_future_instances: u32,
}

impl Default for TasksSyncSettings {
    fn default() -> Self {
        Self {
            include_completed: true,
            include_without_due: true,
            overdue_show_today: true,
            repeat_past_instances_days: 30,
            repeat_future_instances: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidaysSection {
    pub enabled: bool,
    pub preserve_history: bool,
    pub url: String,
}

impl Default for HolidaysSection {
    fn default() -> Self {
        Self {
            enabled: true,
            preserve_history: true,
            url: DEFAULT_HOLIDAY_FEED_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IcsSection {
    pub contacts: IcsContactsSettings,
    pub tasks: IcsTasksSettings,
    pub holidays: IcsHolidaysSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IcsContactsSettings {
    pub enabled: bool,
    pub output_path: Option<PathBuf>,
    pub calendar_name: String,
    pub event_markers: EventMarkers,
    pub emoji: ContactEmojiSettings,
    pub reminders: ContactReminderSettings,
}

impl Default for IcsContactsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            output_path: None,
            calendar_name: "Google Contacts".to_string(),
            event_markers: EventMarkers::default(),
            emoji: ContactEmojiSettings::default(),
            reminders: ContactReminderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactEmojiSettings {
    pub birthday: String,
    pub anniversary: String,
}

impl Default for ContactEmojiSettings {
    fn default() -> Self {
        let emoji = ContactEmoji::default();
        Self {
            birthday: emoji.birthday,
            anniversary: emoji.anniversary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactReminderSettings {
    pub birthday: Vec<String>,
    pub lunar_birthday: Vec<String>,
    pub anniversary: Vec<String>,
}

impl Default for ContactReminderSettings {
    fn default() -> Self {
        Self {
            birthday: day_reminders(),
            lunar_birthday: day_reminders(),
            anniversary: day_reminders(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IcsTasksSettings {
    pub enabled: bool,
    pub output_path: Option<PathBuf>,
    pub calendar_name: String,
    pub add_tasklist_to_summary: bool,
    pub add_status_to_description: bool,
    pub reminders: Vec<String>,
    pub emoji: TaskEmojiSettings,
}

impl Default for IcsTasksSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            output_path: None,
            calendar_name: "Google Tasks".to_string(),
            add_tasklist_to_summary: false,
            add_status_to_description: true,
            reminders: day_reminders(),
            emoji: TaskEmojiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskEmojiSettings {
    pub completed: String,
    pub incomplete: String,
    pub overdue: String,
}

impl Default for TaskEmojiSettings {
    fn default() -> Self {
        let emoji = TaskEmoji::default();
        Self {
            completed: emoji.completed,
            incomplete: emoji.incomplete,
            overdue: emoji.overdue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IcsHolidaysSettings {
    pub enabled: bool,
    pub holiday_output_path: Option<PathBuf>,
    pub festival_output_path: Option<PathBuf>,
    pub holiday_calendar_name: String,
    pub festival_calendar_name: String,
    pub reminders: HolidayReminderSettings,
}

impl Default for IcsHolidaysSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            holiday_output_path: None,
            festival_output_path: None,
            holiday_calendar_name: "中国法定假日".to_string(),
            festival_calendar_name: "中国传统节日".to_string(),
            reminders: HolidayReminderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayReminderSettings {
    pub holiday: Vec<String>,
    pub festival: Vec<String>,
}

impl Default for HolidayReminderSettings {
    fn default() -> Self {
        Self {
            holiday: vec!["-2 09:00".to_string(), "-14 09:00".to_string()],
            festival: vec!["09:00".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    pub level: String,
    /// compact, pretty or json.
    pub format: String,
    /// Also append logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}

fn day_reminders() -> Vec<String> {
    vec!["09:00".to_string(), "19:00".to_string()]
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl EngineConfig {
    /// Loads configuration from the default path; a missing file gives defaults.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| CliError::config(format!("{} in {}", e, path.display())))
    }

    pub fn from_toml(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calengine")
    }

    /// Returns the default data directory, where tokens and outputs go.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calengine")
    }
}

// ---------------------------------------------------------------------------
// Validated settings
// ---------------------------------------------------------------------------

/// Typed settings for one run.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub timezone: Tz,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
    pub reminders: ReminderTable,
    pub contacts: Option<ContactsStream>,
    pub tasks: Option<TasksStream>,
    pub holidays: Option<HolidaysStream>,
}

#[derive(Debug, Clone)]
pub struct ContactsStream {
    pub settings: ContactSettings,
    pub token_file: PathBuf,
    pub output_path: PathBuf,
    pub calendar_name: String,
}

#[derive(Debug, Clone)]
pub struct TasksStream {
    pub settings: TaskSettings,
    pub token_file: PathBuf,
    pub output_path: PathBuf,
    pub calendar_name: String,
}

#[derive(Debug, Clone)]
pub struct HolidaysStream {
    pub settings: HolidaySettings,
    pub url: String,
    pub holidays: HolidayFile,
    pub festivals: HolidayFile,
}

impl EngineConfig {
    /// Checks every value and builds the typed settings.
    pub fn validate(&self) -> CliResult<SyncSettings> {
        let timezone: Tz = self.sync.timezone.parse().map_err(|_| {
            CliError::config(format!("unknown timezone '{}' in [sync]", self.sync.timezone))
        })?;

        let retry = self.retry_policy()?;

        if self.google_api.http_timeout_seconds == 0 {
            return Err(CliError::config("google_api.http_timeout_seconds must be positive"));
        }

        let data_dir = Self::default_data_dir();
        let or_data = |path: &Option<PathBuf>, file: &str| {
            path.clone().unwrap_or_else(|| data_dir.join(file))
        };

        let contacts = (self.google_api.contacts.enabled && self.ics.contacts.enabled).then(|| {
            let ics = &self.ics.contacts;
            ContactsStream {
                settings: ContactSettings {
                    years_past: self.sync.contacts.years_past,
                    years_future: self.sync.contacts.years_future,
                    markers: ics.event_markers.clone(),
                    emoji: ContactEmoji {
                        birthday: ics.emoji.birthday.clone(),
                        anniversary: ics.emoji.anniversary.clone(),
                    },
                },
                token_file: or_data(&self.google_api.contacts.token_file, "token_contacts.json"),
                output_path: or_data(&ics.output_path, "contacts.ics"),
                calendar_name: ics.calendar_name.clone(),
            }
        });

        let tasks = (self.google_api.tasks.enabled && self.ics.tasks.enabled).then(|| {
            let ics = &self.ics.tasks;
            let sync = &self.sync.tasks;
            TasksStream {
                settings: TaskSettings {
                    include_completed: sync.include_completed,
                    include_without_due: sync.include_without_due,
                    overdue_show_today: sync.overdue_show_today,
                    repeat_past_instances_days: sync.repeat_past_instances_days,
                    repeat_future_instances: sync.repeat_future_instances,
                    add_tasklist_to_summary: ics.add_tasklist_to_summary,
                    add_status_to_description: ics.add_status_to_description,
                    emoji: TaskEmoji {
                        completed: ics.emoji.completed.clone(),
                        incomplete: ics.emoji.incomplete.clone(),
                        overdue: ics.emoji.overdue.clone(),
                    },
                },
                token_file: or_data(&self.google_api.tasks.token_file, "token_tasks.json"),
                output_path: or_data(&ics.output_path, "tasks.ics"),
                calendar_name: ics.calendar_name.clone(),
            }
        });

        let holidays = (self.holidays.enabled && self.ics.holidays.enabled).then(|| {
            let ics = &self.ics.holidays;
            HolidaysStream {
                settings: HolidaySettings {
                    preserve_history: self.holidays.preserve_history,
                },
                url: self.holidays.url.clone(),
                holidays: HolidayFile {
                    path: or_data(&ics.holiday_output_path, "cn_zh_hol.ics"),
                    calendar_name: ics.holiday_calendar_name.clone(),
                },
                festivals: HolidayFile {
                    path: or_data(&ics.festival_output_path, "cn_zh_fest.ics"),
                    calendar_name: ics.festival_calendar_name.clone(),
                },
            }
        });

        if let Some(holidays) = &holidays {
            if holidays.url.trim().is_empty() {
                return Err(CliError::config("holidays.url must not be empty"));
            }
            if holidays.holidays.path == holidays.festivals.path {
                return Err(CliError::config(
                    "holiday and festival streams must write to different files",
                ));
            }
        }

        Ok(SyncSettings {
            timezone,
            retry,
            http_timeout: Duration::from_secs(self.google_api.http_timeout_seconds),
            reminders: self.reminder_table()?,
            contacts,
            tasks,
            holidays,
        })
    }

    fn retry_policy(&self) -> CliResult<RetryPolicy> {
        let retry = &self.google_api.retry;
        if retry.max_attempts == 0 {
            return Err(CliError::config("google_api.retry.max_attempts must be at least 1"));
        }
        if retry.min_wait_seconds > retry.max_wait_seconds {
            return Err(CliError::config(
                "google_api.retry.min_wait_seconds must not exceed max_wait_seconds",
            ));
        }
        if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
            return Err(CliError::config("google_api.retry.multiplier must be at least 1"));
        }
        Ok(RetryPolicy::new(
            retry.max_attempts,
            Duration::from_secs(retry.min_wait_seconds),
            Duration::from_secs(retry.max_wait_seconds),
            retry.multiplier,
        ))
    }

    fn reminder_table(&self) -> CliResult<ReminderTable> {
        let parse = |section: &str, specs: &[String]| {
            ReminderSpec::parse_all(specs)
                .map_err(|e| CliError::config(format!("invalid reminder in {}: {}", section, e)))
        };

        let contacts = &self.ics.contacts.reminders;
        let holidays = &self.ics.holidays.reminders;
        Ok(ReminderTable::new()
            .with(EventCategory::Birthday, parse("ics.contacts.reminders.birthday", &contacts.birthday)?)
            .with(
                EventCategory::LunarBirthday,
                parse("ics.contacts.reminders.lunar_birthday", &contacts.lunar_birthday)?,
            )
            .with(
                EventCategory::Anniversary,
                parse("ics.contacts.reminders.anniversary", &contacts.anniversary)?,
            )
            .with(EventCategory::Task, parse("ics.tasks.reminders", &self.ics.tasks.reminders)?)
            .with(EventCategory::Holiday, parse("ics.holidays.reminders.holiday", &holidays.holiday)?)
            .with(EventCategory::Festival, parse("ics.holidays.reminders.festival", &holidays.festival)?))
    }
}
