//! Event synthesis and output.
//!
//! Turns normalized records into calendar events and writes them:
//!
//! - [`ContactSynthesizer`] - yearly birthdays, lunar birthdays, anniversaries
//! - [`TaskSynthesizer`] - dated, recurring and overdue task instances
//! - [`HolidaySynthesizer`] - holiday/festival split merged with history
//! - [`EventAssembler`] - stable UIDs and alarms
//! - [`CalendarWriter`] - ICS output
//! - [`Pipeline`] - a full run with per-stream outcomes

pub mod assemble;
pub mod contacts;
pub mod error;
pub mod holidays;
pub mod pipeline;
pub mod settings;
pub mod tasks;
pub mod writer;

pub use assemble::{EventAssembler, Occurrence};
pub use contacts::{ContactSynthesizer, ordinal};
pub use error::{SyncError, SyncResult};
pub use holidays::{
    HistoryMerger, HolidayStreams, HolidaySynthesizer, IcsHistory, InMemoryHistory,
    PriorEventsProvider,
};
pub use pipeline::{
    ContactsJob, HolidayFile, HolidaysJob, Pipeline, RunReport, StreamKind, StreamOutcome,
    StreamOutput, StreamReport, TasksJob,
};
pub use settings::{
    ContactEmoji, ContactSettings, HolidaySettings, TaskEmoji, TaskSettings, default_reminders,
};
pub use tasks::{OverdueDecision, OverdueStrategy, TaskSynthesizer};
pub use writer::{CalendarMeta, CalendarWriter, IcsFileWriter, render_calendar};
