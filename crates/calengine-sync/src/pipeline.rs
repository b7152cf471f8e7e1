//! One synchronization run across all enabled streams.
//!
//! Each stream goes fetch, normalize, synthesize, assemble, write. Streams are
//! independent: a stream that fails is reported and its output file is left
//! as it was, while the remaining streams still run.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, error, info};

use calengine_core::{CalendarEvent, Clock, Diagnostics, EventCategory, ReminderTable};
use calengine_providers::{
    ContactNormalizer, HolidayNormalizer, RawHoliday, RawPerson, RawTaskList, RecordSource, ResilientFetcher,
    SourceNormalizer, TaskNormalizer,
};

use crate::assemble::EventAssembler;
use crate::contacts::ContactSynthesizer;
use crate::error::{SyncError, SyncResult};
use crate::holidays::{HolidaySynthesizer, IcsHistory, PriorEventsProvider};
use crate::tasks::TaskSynthesizer;
use crate::writer::{CalendarMeta, CalendarWriter, IcsFileWriter};

/// The three synchronized domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Contacts,
    Tasks,
    Holidays,
}

impl StreamKind {
    pub const ALL: [StreamKind; 3] = [Self::Contacts, Self::Tasks, Self::Holidays];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Tasks => "tasks",
            Self::Holidays => "holidays",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contacts" => Ok(Self::Contacts),
            "tasks" => Ok(Self::Tasks),
            "holidays" => Ok(Self::Holidays),
            other => Err(format!("unknown stream '{other}' (expected contacts, tasks or holidays)")),
        }
    }
}

/// A calendar file and the writer that produces it.
pub struct StreamOutput {
    pub meta: CalendarMeta,
    pub writer: Box<dyn CalendarWriter + Send + Sync>,
}

impl StreamOutput {
    pub fn new(meta: CalendarMeta, writer: impl CalendarWriter + Send + Sync + 'static) -> Self {
        Self {
            meta,
            writer: Box::new(writer),
        }
    }

    fn write(&self, events: &[CalendarEvent]) -> SyncResult<()> {
        debug!(target_file = %self.writer.describe(), events = events.len(), "Writing stream");
        self.writer.write(&self.meta, events)
    }
}

pub struct ContactsJob {
    pub source: Box<dyn RecordSource<Record = RawPerson>>,
    pub normalizer: ContactNormalizer,
    pub synthesizer: ContactSynthesizer,
    pub reminders: ReminderTable,
    pub output: StreamOutput,
}

pub struct TasksJob {
    pub source: Box<dyn RecordSource<Record = RawTaskList>>,
    pub normalizer: TaskNormalizer,
    pub synthesizer: TaskSynthesizer,
    pub reminders: ReminderTable,
    pub output: StreamOutput,
}

/// Holidays produce two outputs, each merged with its own history.
pub struct HolidaysJob {
    pub source: Box<dyn RecordSource<Record = RawHoliday>>,
    pub synthesizer: HolidaySynthesizer,
    pub reminders: ReminderTable,
    pub holiday_output: StreamOutput,
    pub holiday_history: Box<dyn PriorEventsProvider + Send + Sync>,
    pub festival_output: StreamOutput,
    pub festival_history: Box<dyn PriorEventsProvider + Send + Sync>,
}

/// Where a holiday stream is written; the same file is its history.
#[derive(Debug, Clone)]
pub struct HolidayFile {
    pub path: std::path::PathBuf,
    pub calendar_name: String,
}

impl HolidaysJob {
    /// A job writing to, and reading history from, ICS files.
    pub fn with_files(
        source: Box<dyn RecordSource<Record = RawHoliday>>,
        synthesizer: HolidaySynthesizer,
        reminders: ReminderTable,
        holidays: HolidayFile,
        festivals: HolidayFile,
    ) -> Self {
        Self {
            source,
            synthesizer,
            reminders,
            holiday_history: Box::new(IcsHistory::new(&holidays.path)),
            holiday_output: StreamOutput::new(
                CalendarMeta::holidays(holidays.calendar_name),
                IcsFileWriter::new(holidays.path),
            ),
            festival_history: Box::new(IcsHistory::new(&festivals.path)),
            festival_output: StreamOutput::new(
                CalendarMeta::holidays(festivals.calendar_name),
                IcsFileWriter::new(festivals.path),
            ),
        }
    }
}

/// How one stream ended.
#[derive(Debug)]
pub enum StreamOutcome {
    Written {
        events: usize,
        warnings: usize,
    },
    Failed(SyncError),
}

#[derive(Debug)]
pub struct StreamReport {
    pub kind: StreamKind,
    pub outcome: StreamOutcome,
}

impl StreamReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StreamOutcome::Written { .. })
    }
}

/// Result of a run: one report per stream that was attempted.
#[derive(Debug, Default)]
pub struct RunReport {
    pub streams: Vec<StreamReport>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.streams.iter().all(StreamReport::is_success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &StreamReport> {
        self.streams.iter().filter(|s| !s.is_success())
    }

    pub fn get(&self, kind: StreamKind) -> Option<&StreamReport> {
        self.streams.iter().find(|s| s.kind == kind)
    }
}

pub struct Pipeline {
    fetcher: ResilientFetcher,
    clock: Box<dyn Clock>,
    contacts: Option<ContactsJob>,
    tasks: Option<TasksJob>,
    holidays: Option<HolidaysJob>,
}

impl Pipeline {
    pub fn new(fetcher: ResilientFetcher, clock: impl Clock + 'static) -> Self {
        Self {
            fetcher,
            clock: Box::new(clock),
            contacts: None,
            tasks: None,
            holidays: None,
        }
    }

    #[must_use]
    pub fn with_contacts(mut self, job: ContactsJob) -> Self {
        self.contacts = Some(job);
        self
    }

    #[must_use]
    pub fn with_tasks(mut self, job: TasksJob) -> Self {
        self.tasks = Some(job);
        self
    }

    #[must_use]
    pub fn with_holidays(mut self, job: HolidaysJob) -> Self {
        self.holidays = Some(job);
        self
    }

    /// Streams that have a job configured.
    pub fn enabled(&self) -> Vec<StreamKind> {
        StreamKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                StreamKind::Contacts => self.contacts.is_some(),
                StreamKind::Tasks => self.tasks.is_some(),
                StreamKind::Holidays => self.holidays.is_some(),
            })
            .collect()
    }

    /// Runs every configured stream, or just `only` when given.
    pub async fn run(&self, only: Option<StreamKind>) -> RunReport {
        let today = self.clock.today();
        let started = Instant::now();
        info!(%today, "Starting sync run");

        let mut report = RunReport::default();
        for kind in self.enabled() {
            if only.is_some_and(|o| o != kind) {
                continue;
            }

            let mut diagnostics = Diagnostics::new();
            let result = match kind {
                StreamKind::Contacts => self.run_contacts(today, &mut diagnostics).await,
                StreamKind::Tasks => self.run_tasks(today, &mut diagnostics).await,
                StreamKind::Holidays => self.run_holidays(&mut diagnostics).await,
            };

            let warnings = diagnostics.warning_count();
            diagnostics.emit(kind.as_str());

            let outcome = match result {
                Ok(events) => {
                    info!(stream = kind.as_str(), events, warnings, "Stream synchronized");
                    StreamOutcome::Written { events, warnings }
                }
                Err(e) => {
                    error!(stream = kind.as_str(), error = %e, "Stream failed, previous output kept");
                    StreamOutcome::Failed(e)
                }
            };
            report.streams.push(StreamReport { kind, outcome });
        }

        info!(
            elapsed = ?started.elapsed(),
            failed = report.failed().count(),
            "Sync run finished"
        );
        report
    }

    async fn run_contacts(&self, today: NaiveDate, diagnostics: &mut Diagnostics) -> SyncResult<usize> {
        let Some(job) = &self.contacts else {
            return Ok(0);
        };

        let raw = self.fetcher.fetch_all(job.source.as_ref()).await?;
        let records = job.normalizer.normalize_all(&raw, diagnostics);
        debug!(people = raw.len(), records = records.len(), "Normalized contacts");

        let occurrences = job.synthesizer.synthesize(&records, today, diagnostics);
        let events = EventAssembler::new("contacts", job.reminders.clone()).assemble(occurrences, diagnostics);

        job.output.write(&events)?;
        Ok(events.len())
    }

    async fn run_tasks(&self, today: NaiveDate, diagnostics: &mut Diagnostics) -> SyncResult<usize> {
        let Some(job) = &self.tasks else {
            return Ok(0);
        };

        let raw = self.fetcher.fetch_all(job.source.as_ref()).await?;
        let records = job.normalizer.normalize_all(&raw, diagnostics);
        debug!(lists = raw.len(), tasks = records.len(), "Normalized tasks");

        let occurrences = job.synthesizer.synthesize(&records, today, diagnostics);
        let events = EventAssembler::new("tasks", job.reminders.clone()).assemble(occurrences, diagnostics);

        job.output.write(&events)?;
        Ok(events.len())
    }

    async fn run_holidays(&self, diagnostics: &mut Diagnostics) -> SyncResult<usize> {
        let Some(job) = &self.holidays else {
            return Ok(0);
        };

        let raw = self.fetcher.fetch_all(job.source.as_ref()).await?;
        let records = HolidayNormalizer.normalize_all(&raw, diagnostics);

        let streams = job.synthesizer.synthesize(
            records,
            job.holiday_history.as_ref(),
            job.festival_history.as_ref(),
            diagnostics,
        )?;

        let assembler = EventAssembler::new("holidays", job.reminders.clone());
        let holidays = assembler.assemble(
            HolidaySynthesizer::occurrences(&streams.holidays, EventCategory::Holiday),
            diagnostics,
        );
        let festivals = assembler.assemble(
            HolidaySynthesizer::occurrences(&streams.festivals, EventCategory::Festival),
            diagnostics,
        );

        job.holiday_output.write(&holidays)?;
        job.festival_output.write(&festivals)?;
        Ok(holidays.len() + festivals.len())
    }
}
