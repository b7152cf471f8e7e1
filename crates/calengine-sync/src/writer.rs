//! ICS serialization of assembled events.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use icalendar::{Alarm as IcsAlarm, Calendar, Component, EventLike, Property, Trigger, ValueType};
use tracing::info;

use calengine_core::{Alarm, CalendarEvent};

use crate::error::{SyncError, SyncResult};

/// Calendar-level properties of one output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    pub name: String,
    pub prodid: String,
    /// Extra calendar properties, written after `X-WR-CALNAME`.
    pub properties: Vec<(String, String)>,
}

impl CalendarMeta {
    pub fn new(name: impl Into<String>, prodid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prodid: prodid.into(),
            properties: Vec::new(),
        }
    }

    pub fn contacts(name: impl Into<String>) -> Self {
        Self::new(name, "-//Calendar Engine - Contacts//EN")
    }

    pub fn tasks(name: impl Into<String>) -> Self {
        Self::new(name, "-//Calendar Engine - Tasks//EN")
    }

    pub fn holidays(name: impl Into<String>) -> Self {
        Self::new(name, "-//Calendar Engine//Holidays//EN")
            .with_property("X-APPLE-LANGUAGE", "zh")
            .with_property("X-APPLE-REGION", "CN")
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }
}

/// Destination for one output stream.
pub trait CalendarWriter {
    fn write(&self, meta: &CalendarMeta, events: &[CalendarEvent]) -> SyncResult<()>;

    /// Where the output goes, for logging.
    fn describe(&self) -> String;
}

/// Writes a stream to an `.ics` file.
///
/// Content goes to a temporary sibling first and is renamed into place, so a
/// failed write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct IcsFileWriter {
    path: PathBuf,
}

impl IcsFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "calendar.ics".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

impl CalendarWriter for IcsFileWriter {
    fn write(&self, meta: &CalendarMeta, events: &[CalendarEvent]) -> SyncResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }

        let content = render_calendar(meta, events, Utc::now());
        let temp = self.temp_path();
        std::fs::write(&temp, content).map_err(|e| SyncError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| SyncError::io(&self.path, e))?;

        info!(path = %self.path.display(), events = events.len(), "Wrote calendar");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Renders a complete calendar. `stamp` becomes every event's `DTSTAMP`.
pub fn render_calendar(meta: &CalendarMeta, events: &[CalendarEvent], stamp: DateTime<Utc>) -> String {
    let mut cal = Calendar::new();
    cal.append_property(Property::new("X-WR-CALNAME", &meta.name));
    for (key, value) in &meta.properties {
        cal.append_property(Property::new(key, value));
    }

    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    for event in events {
        cal.push(render_event(event, &dtstamp));
    }

    finish_output(&cal.done().to_string(), &meta.prodid)
}

fn render_event(event: &CalendarEvent, dtstamp: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.add_property("DTSTAMP", dtstamp);
    ics_event.summary(&event.summary);

    let mut start = Property::new("DTSTART", event.start.format("%Y%m%d").to_string());
    start.append_parameter(ValueType::Date);
    ics_event.append_property(start);

    let mut end = Property::new("DTEND", event.end().format("%Y%m%d").to_string());
    end.append_parameter(ValueType::Date);
    ics_event.append_property(end);

    if !event.description.is_empty() {
        ics_event.description(&event.description);
    }

    ics_event.append_multi_property(Property::new("CATEGORIES", event.category.ics_category()));
    for tag in &event.tags {
        ics_event.append_multi_property(Property::new("CATEGORIES", tag));
    }

    ics_event.add_property("TRANSP", "TRANSPARENT");

    for alarm in &event.alarms {
        ics_event.alarm(render_alarm(alarm));
    }

    ics_event.done()
}

fn render_alarm(alarm: &Alarm) -> IcsAlarm {
    let offset = alarm.trigger_offset();
    let trigger = if offset < chrono::Duration::zero() {
        Trigger::before_start(-offset)
    } else {
        Trigger::after_start(offset)
    };
    IcsAlarm::display(&alarm.description, trigger)
}

/// Sets our PRODID and drops the `DTSTAMP`/`UID` lines icalendar adds inside
/// `VALARM`, which would make output differ between identical runs.
fn finish_output(ics: &str, prodid: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_valarm = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(prodid);
            result.push_str("\r\n");
            continue;
        }

        if line == "BEGIN:VALARM" {
            in_valarm = true;
        } else if line == "END:VALARM" {
            in_valarm = false;
        }

        if in_valarm && (line.starts_with("DTSTAMP:") || line.starts_with("UID:")) {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
