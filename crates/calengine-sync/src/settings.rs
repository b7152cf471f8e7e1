//! Validated per-domain settings.
//!
//! Built once at startup from the configuration file; synthesis code never
//! looks at raw configuration values.

use calengine_core::{EventCategory, ReminderSpec, ReminderTable};
use calengine_providers::EventMarkers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmoji {
    pub birthday: String,
    pub anniversary: String,
}

impl Default for ContactEmoji {
    fn default() -> Self {
        Self {
            birthday: "🎂".to_string(),
            anniversary: "💍".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSettings {
    /// Years before the current year to generate occurrences for.
    pub years_past: u32,
    /// Years after the current year to generate occurrences for.
    pub years_future: u32,
    pub markers: EventMarkers,
    pub emoji: ContactEmoji,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            years_past: 5,
            years_future: 5,
            markers: EventMarkers::default(),
            emoji: ContactEmoji::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEmoji {
    pub completed: String,
    pub incomplete: String,
    pub overdue: String,
}

impl Default for TaskEmoji {
    fn default() -> Self {
        Self {
            completed: "✔️".to_string(),
            incomplete: "⭕️".to_string(),
            overdue: "⚠️".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSettings {
    pub include_completed: bool,
    /// Place tasks without a due date on their completion date, or today.
    pub include_without_due: bool,
    pub overdue_show_today: bool,
    /// Age, in days, past which a completed recurring task is shown on its
    /// completion date instead of its due date.
    pub repeat_past_instances_days: u32,
    /// Instances emitted for an incomplete recurring task, the first included.
    pub repeat_future_instances: u32,
    pub add_tasklist_to_summary: bool,
    pub add_status_to_description: bool,
    pub emoji: TaskEmoji,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            include_completed: true,
            include_without_due: true,
            overdue_show_today: true,
            repeat_past_instances_days: 30,
            repeat_future_instances: 10,
            add_tasklist_to_summary: false,
            add_status_to_description: true,
            emoji: TaskEmoji::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidaySettings {
    /// Merge each stream with its previous output.
    pub preserve_history: bool,
}

impl Default for HolidaySettings {
    fn default() -> Self {
        Self {
            preserve_history: true,
        }
    }
}

/// The reminder table used when the configuration file names none.
pub fn default_reminders() -> ReminderTable {
    let at = |spec: &str| spec.parse::<ReminderSpec>().ok();
    let specs = |list: &[&str]| list.iter().filter_map(|s| at(s)).collect::<Vec<_>>();

    ReminderTable::new()
        .with(EventCategory::Birthday, specs(&["09:00", "19:00"]))
        .with(EventCategory::LunarBirthday, specs(&["09:00", "19:00"]))
        .with(EventCategory::Anniversary, specs(&["09:00", "19:00"]))
        .with(EventCategory::Task, specs(&["09:00", "19:00"]))
        .with(EventCategory::Holiday, specs(&["-2 09:00", "-14 09:00"]))
        .with(EventCategory::Festival, specs(&["09:00"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let tasks = TaskSettings::default();
        assert!(tasks.overdue_show_today);
        assert_eq!(tasks.repeat_past_instances_days, 30);
        assert_eq!(tasks.repeat_future_instances, 10);
        assert_eq!(ContactSettings::default().years_past, 5);
        assert!(HolidaySettings::default().preserve_history);
    }

    #[test]
    fn default_reminders_cover_every_category() {
        let table = default_reminders();
        assert_eq!(table.specs(EventCategory::Birthday).len(), 2);
        assert_eq!(table.specs(EventCategory::Holiday)[1].days_before, 14);
        assert_eq!(table.specs(EventCategory::Festival).len(), 1);
    }
}
