//! Core types: events, alarms, lunar dates, recurrence, reminders

pub mod diagnostics;
pub mod event;
pub mod lunar;
pub mod record;
pub mod recurrence;
pub mod reminder;
pub mod time;
pub mod tracing;
pub mod uid;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use event::{Alarm, CalendarEvent, DedupKey, EventCategory};
pub use lunar::{LunarConversion, LunarDate, LunarError};
pub use record::{ContactEventKind, ContactRecord, HolidayRecord, SpecialDay, TaskRecord};
pub use recurrence::{Expansion, ExpansionWindow, RecurrenceError, RecurrencePattern, RecurrenceUnit};
pub use reminder::{ReminderParseError, ReminderSpec, ReminderTable};
pub use time::{Clock, FixedClock, SystemClock};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use uid::stable_uid;
