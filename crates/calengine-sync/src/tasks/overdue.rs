use chrono::NaiveDate;

use calengine_core::TaskRecord;

/// What to emit for a task relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverdueDecision {
    /// Completed, undated, or due today or later.
    OnTime,
    /// Past due; only the original-date instance is emitted.
    OriginalOnly { due: NaiveDate },
    /// Past due; the original-date instance plus one on `today`.
    OriginalAndToday { due: NaiveDate, today: NaiveDate },
}

impl OverdueDecision {
    /// The date of the extra "today" instance, if one is due.
    pub fn today_instance(&self) -> Option<NaiveDate> {
        match self {
            Self::OriginalAndToday { today, .. } => Some(*today),
            _ => None,
        }
    }
}

/// Decides whether an incomplete past-due task also appears on today's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverdueStrategy {
    show_today: bool,
}

impl OverdueStrategy {
    pub fn new(show_today: bool) -> Self {
        Self { show_today }
    }

    /// `today` must already be the date in the sync timezone.
    pub fn evaluate(&self, task: &TaskRecord, today: NaiveDate) -> OverdueDecision {
        match task.due {
            Some(due) if !task.completed && due < today => {
                if self.show_today {
                    OverdueDecision::OriginalAndToday { due, today }
                } else {
                    OverdueDecision::OriginalOnly { due }
                }
            }
            _ => OverdueDecision::OnTime,
        }
    }
}
