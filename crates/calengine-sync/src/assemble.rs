//! Final assembly: occurrences to immutable calendar events.
//!
//! Every synthesizer describes what it wants emitted as [`Occurrence`]s. The
//! [`EventAssembler`] derives a stable UID from each occurrence key, attaches
//! the alarms configured for its category, and returns events in date order.

use std::collections::HashSet;

use chrono::NaiveDate;

use calengine_core::{CalendarEvent, Diagnostics, EventCategory, ReminderTable, stable_uid};

/// One logical occurrence to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Identifies the occurrence across runs. Hashed into the UID.
    pub key: String,
    pub date: NaiveDate,
    pub category: EventCategory,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Name used in alarm text; the summary when unset.
    pub alarm_subject: Option<String>,
}

impl Occurrence {
    pub fn new(
        key: impl Into<String>,
        date: NaiveDate,
        category: EventCategory,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            date,
            category,
            summary: summary.into(),
            description: String::new(),
            tags: Vec::new(),
            alarm_subject: None,
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
    pub fn with_alarm_subject(mut self, subject: impl Into<String>) -> Self {
        self.alarm_subject = Some(subject.into());
        self
    }
}

/// Builds events for one output stream.
#[derive(Debug, Clone)]
pub struct EventAssembler {
    domain: String,
    reminders: ReminderTable,
}

impl EventAssembler {
    /// `domain` becomes the UID suffix (`@calendar-engine-{domain}`).
    pub fn new(domain: impl Into<String>, reminders: ReminderTable) -> Self {
        Self {
            domain: domain.into(),
            reminders,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn assemble_one(&self, occurrence: Occurrence) -> CalendarEvent {
        let subject = occurrence
            .alarm_subject
            .as_deref()
            .unwrap_or(&occurrence.summary);
        let alarms = self.reminders.alarms_for(occurrence.category, subject);

        CalendarEvent::new(
            stable_uid(&occurrence.key, &self.domain),
            occurrence.summary,
            occurrence.date,
            occurrence.category,
        )
        .with_description(occurrence.description)
        .with_tags(occurrence.tags)
        .with_alarms(alarms)
    }

    /// Assembles all occurrences, sorted by date then summary.
    ///
    /// Two occurrences with the same key are the same event: the first one is
    /// kept and the repeat is reported.
    pub fn assemble(
        &self,
        occurrences: Vec<Occurrence>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<CalendarEvent> {
        let mut seen = HashSet::new();
        let mut events = Vec::with_capacity(occurrences.len());

        for occurrence in occurrences {
            if !seen.insert(occurrence.key.clone()) {
                diagnostics.info(&occurrence.summary, format!("duplicate occurrence '{}' dropped", occurrence.key));
                continue;
            }
            events.push(self.assemble_one(occurrence));
        }

        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.summary.cmp(&b.summary)));
        events
    }
}
