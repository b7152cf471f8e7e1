use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use calengine_core::{Diagnostics, TaskRecord};

use super::SourceNormalizer;
use crate::raw::{RawTask, RawTaskList};

const UNTITLED_TASK: &str = "Untitled Task";
const UNTITLED_SUBTASK: &str = "Untitled";

/// Flattens task lists into task records, attaching subtask titles to parents.
///
/// Subtasks are records of their own as well; the parent only lists them.
#[derive(Debug, Clone)]
pub struct TaskNormalizer {
    tz: Tz,
}

impl Default for TaskNormalizer {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl TaskNormalizer {
    /// `tz` converts completion timestamps to local dates.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    fn completed_on(&self, value: &str) -> Option<NaiveDate> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => Some(dt.with_timezone(&self.tz).date_naive()),
            Err(_) => parse_due(value),
        }
    }
}

/// The date part of a due timestamp. The Tasks API stores dates only, always
/// at midnight UTC, so the time and offset are ignored.
fn parse_due(value: &str) -> Option<NaiveDate> {
    let date = value.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

impl SourceNormalizer for TaskNormalizer {
    type Raw = RawTaskList;
    type Record = TaskRecord;

    fn normalize(&self, list: &RawTaskList, diagnostics: &mut Diagnostics) -> Vec<TaskRecord> {
        let live: Vec<&RawTask> = list
            .tasks
            .iter()
            .filter(|t| t.deleted != Some(true))
            .collect();

        let mut children: HashMap<&str, Vec<String>> = HashMap::new();
        for task in &live {
            if let Some(parent) = task.parent.as_deref() {
                let title = non_empty(task.title.as_deref())
                    .unwrap_or_else(|| UNTITLED_SUBTASK.to_string());
                children.entry(parent).or_default().push(title);
            }
        }

        let mut records = Vec::with_capacity(live.len());
        for task in live {
            let Some(id) = non_empty(task.id.as_deref()) else {
                diagnostics.warn(&list.title, "task without id skipped");
                continue;
            };
            let title = non_empty(task.title.as_deref()).unwrap_or_else(|| UNTITLED_TASK.to_string());

            let due = match task.due.as_deref() {
                Some(raw) => {
                    let parsed = parse_due(raw);
                    if parsed.is_none() {
                        diagnostics.warn(&title, format!("unreadable due date '{}', treated as none", raw));
                    }
                    parsed
                }
                None => None,
            };
            let completed_on = task.completed.as_deref().and_then(|c| self.completed_on(c));

            records.push(TaskRecord {
                subtasks: children.get(id.as_str()).cloned().unwrap_or_default(),
                id,
                list_title: list.title.clone(),
                title,
                notes: non_empty(task.notes.as_deref()),
                completed: task.is_completed(),
                due,
                completed_on,
                web_link: non_empty(task.web_view_link.as_deref()),
            });
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(json: &str) -> RawTaskList {
        RawTaskList {
            id: "L1".into(),
            title: "Personal".into(),
            tasks: serde_json::from_str(json).unwrap(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parent_lists_its_subtasks() {
        let raw = list(
            r#"[
            {"id": "p", "title": "Trip", "status": "needsAction", "due": "2025-03-01T00:00:00.000Z"},
            {"id": "c1", "title": "Book hotel", "parent": "p", "status": "needsAction"},
            {"id": "c2", "parent": "p", "status": "completed"}
        ]"#,
        );

        let mut diagnostics = Diagnostics::new();
        let records = TaskNormalizer::default().normalize(&raw, &mut diagnostics);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].subtasks, vec!["Book hotel".to_string(), "Untitled".to_string()]);
        assert_eq!(records[0].due, Some(date(2025, 3, 1)));
        assert_eq!(records[0].list_title, "Personal");
        assert!(records[1].subtasks.is_empty());
        assert_eq!(records[2].title, "Untitled Task");
        assert!(records[2].completed);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn completion_date_follows_timezone() {
        let raw = list(
            r#"[{"id": "t", "title": "Late", "status": "completed",
                "completed": "2025-02-20T20:30:00.000Z"}]"#,
        );

        let utc = TaskNormalizer::new(Tz::UTC).normalize_all(&[raw.clone()], &mut Diagnostics::new());
        let shanghai = TaskNormalizer::new(Tz::Asia__Shanghai).normalize_all(&[raw], &mut Diagnostics::new());

        assert_eq!(utc[0].completed_on, Some(date(2025, 2, 20)));
        assert_eq!(shanghai[0].completed_on, Some(date(2025, 2, 21)));
    }

    #[test]
    fn deleted_and_id_less_tasks_are_skipped() {
        let raw = list(
            r#"[
            {"id": "gone", "title": "Old", "deleted": true},
            {"title": "No id"},
            {"id": "ok", "title": "Kept", "notes": "  ", "webViewLink": "https://example.test/ok"}
        ]"#,
        );

        let mut diagnostics = Diagnostics::new();
        let records = TaskNormalizer::default().normalize(&raw, &mut diagnostics);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
        assert_eq!(records[0].notes, None);
        assert_eq!(records[0].web_link.as_deref(), Some("https://example.test/ok"));
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn unreadable_due_warns() {
        let raw = list(r#"[{"id": "x", "title": "Weird", "due": "soon"}]"#);
        let mut diagnostics = Diagnostics::new();
        let records = TaskNormalizer::default().normalize(&raw, &mut diagnostics);

        assert_eq!(records[0].due, None);
        assert_eq!(diagnostics.warning_count(), 1);
    }
}
