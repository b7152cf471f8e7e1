//! Task events: single, recurring and overdue instances.
//!
//! A task is placed on its due date. Without one it lands on its completion
//! date (completed) or today (incomplete), when undated tasks are included.
//! Recurrence hints in the title or notes expand incomplete tasks forward
//! into `repeat_future_instances` instances, counting the due date, or
//! counting from today once the task is overdue. Completed recurring tasks
//! keep a single instance.

mod overdue;

pub use overdue::{OverdueDecision, OverdueStrategy};

use chrono::{Days, NaiveDate};

use calengine_core::{Diagnostics, EventCategory, ExpansionWindow, RecurrencePattern, TaskRecord};

use crate::assemble::Occurrence;
use crate::settings::TaskSettings;

/// Tag carried by the today-instance of an overdue task.
pub const OVERDUE_TAG: &str = "Overdue";

/// How an instance is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Completed,
    ToDo,
    Overdue { due: NaiveDate },
}

#[derive(Debug, Clone, Default)]
pub struct TaskSynthesizer {
    settings: TaskSettings,
}

impl TaskSynthesizer {
    pub fn new(settings: TaskSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    pub fn synthesize(
        &self,
        tasks: &[TaskRecord],
        today: NaiveDate,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Occurrence> {
        tasks
            .iter()
            .flat_map(|task| self.task_occurrences(task, today, diagnostics))
            .collect()
    }

    /// Every occurrence for one task, in date order.
    pub fn task_occurrences(
        &self,
        task: &TaskRecord,
        today: NaiveDate,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Occurrence> {
        if task.completed && !self.settings.include_completed {
            return Vec::new();
        }

        let status = if task.completed { Status::Completed } else { Status::ToDo };

        let Some(due) = task.due else {
            return self.undated(task, status, today, diagnostics);
        };

        let decision = OverdueStrategy::new(self.settings.overdue_show_today).evaluate(task, today);

        let Some(pattern) = RecurrencePattern::parse(&task.recurrence_text()) else {
            let mut out = vec![self.occurrence(task, task.id.clone(), due, status)];
            if let Some(today) = decision.today_instance() {
                out.push(self.overdue_occurrence(task, due, today));
            }
            return out;
        };

        if task.completed {
            let date = self.retained_completion_date(task, due, today);
            return vec![self.occurrence(task, task.id.clone(), date, status)];
        }

        // Overdue tasks continue from today instead of replaying missed instances.
        let count = self.settings.repeat_future_instances.max(1);
        let window = if due < today {
            ExpansionWindow::from_date(today, count)
        } else {
            ExpansionWindow::forward(count)
        };

        let mut out = vec![self.occurrence(task, task.id.clone(), due, status)];
        for date in &pattern.expand(due, window) {
            if date == due || decision.today_instance() == Some(date) {
                continue;
            }
            let key = format!("{}-recur-{}", task.id, date);
            out.push(self.occurrence(task, key, date, status));
        }
        if let Some(today) = decision.today_instance() {
            out.push(self.overdue_occurrence(task, due, today));
        }
        out.sort_by_key(|o| o.date);
        out
    }

    /// Date of the one instance kept for a completed recurring task. A due date
    /// older than `repeat_past_instances_days` gives way to the completion date.
    fn retained_completion_date(&self, task: &TaskRecord, due: NaiveDate, today: NaiveDate) -> NaiveDate {
        let floor = today
            .checked_sub_days(Days::new(u64::from(self.settings.repeat_past_instances_days)))
            .unwrap_or(NaiveDate::MIN);
        match task.completed_on {
            Some(done) if due < floor => done,
            _ => due,
        }
    }

    fn overdue_occurrence(&self, task: &TaskRecord, due: NaiveDate, today: NaiveDate) -> Occurrence {
        let key = format!("{}-overdue-{}", task.id, today);
        self.occurrence(task, key, today, Status::Overdue { due })
    }

    fn undated(
        &self,
        task: &TaskRecord,
        status: Status,
        today: NaiveDate,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Occurrence> {
        if !self.settings.include_without_due {
            return Vec::new();
        }
        let date = if task.completed {
            match task.completed_on {
                Some(date) => date,
                None => {
                    diagnostics.warn(&task.title, "completed task has no due or completion date, skipped");
                    return Vec::new();
                }
            }
        } else {
            today
        };
        vec![self.occurrence(task, task.id.clone(), date, status)]
    }

    fn occurrence(&self, task: &TaskRecord, key: String, date: NaiveDate, status: Status) -> Occurrence {
        let emoji = &self.settings.emoji;
        let marker = match status {
            Status::Completed => &emoji.completed,
            Status::ToDo => &emoji.incomplete,
            Status::Overdue { .. } => &emoji.overdue,
        };

        let mut summary = format!("{} {}", marker, task.title);
        if self.settings.add_tasklist_to_summary {
            summary = format!("[{}] {}", task.list_title, summary);
        }

        let mut tags = vec![task.list_title.clone()];
        if matches!(status, Status::Overdue { .. }) {
            tags.push(OVERDUE_TAG.to_string());
        }

        Occurrence::new(key, date, EventCategory::Task, summary)
            .with_description(self.description(task, status))
            .with_tags(tags)
            .with_alarm_subject(task.title.clone())
    }

    fn description(&self, task: &TaskRecord, status: Status) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(notes) = task.notes.as_deref() {
            lines.push(notes.to_string());
            lines.push(String::new());
        }

        match status {
            Status::Overdue { due } => lines.push(format!("Status: Overdue {}", due.format("%Y-%m-%d"))),
            Status::Completed if self.settings.add_status_to_description => {
                lines.push("Status: Completed".to_string())
            }
            Status::ToDo if self.settings.add_status_to_description => lines.push("Status: To Do".to_string()),
            _ => {}
        }

        lines.push(format!("From: {}", task.list_title));
        if let Some(link) = task.web_link.as_deref() {
            lines.push(format!("Link: {link}"));
        }

        if !task.subtasks.is_empty() {
            lines.push(String::new());
            lines.push("Subtasks:".to_string());
            lines.extend(task.subtasks.iter().map(|s| format!("  • {s}")));
        }

        lines.join("\n")
    }
}
