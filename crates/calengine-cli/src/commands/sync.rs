//! The sync command.

use chrono::Utc;
use tracing::{info, warn};

use calengine_core::{Clock, SystemClock};
use calengine_providers::{
    ContactNormalizer, GooglePeopleSource, GoogleTasksSource, HolidayFeedSource, HttpClient,
    ResilientFetcher, TaskNormalizer, TokenFile,
};
use calengine_sync::{
    CalendarMeta, ContactSynthesizer, ContactsJob, HolidaySynthesizer, HolidaysJob, IcsFileWriter, Pipeline,
    RunReport, StreamKind, StreamOutcome, StreamOutput, TaskSynthesizer, TasksJob,
};

use crate::config::SyncSettings;
use crate::error::{CliError, CliResult};

/// Builds the pipeline for the selected streams.
///
/// Token files are read here, so a missing token aborts before any fetch.
pub fn build_pipeline(settings: &SyncSettings, only: Option<StreamKind>) -> CliResult<Pipeline> {
    let selected = |kind: StreamKind| only.is_none_or(|o| o == kind);
    let clock = SystemClock::new(settings.timezone);
    let client = HttpClient::new(settings.http_timeout).map_err(|e| CliError::config(e.to_string()))?;

    let mut pipeline = Pipeline::new(ResilientFetcher::new(settings.retry.clone()), clock);

    if let Some(stream) = settings.contacts.as_ref().filter(|_| selected(StreamKind::Contacts)) {
        let client = authorized(&client, &TokenFile::new(&stream.token_file), &clock)?;
        pipeline = pipeline.with_contacts(ContactsJob {
            source: Box::new(GooglePeopleSource::new(client)),
            normalizer: ContactNormalizer::new(stream.settings.markers.clone()),
            synthesizer: ContactSynthesizer::new(stream.settings.clone()),
            reminders: settings.reminders.clone(),
            output: StreamOutput::new(
                CalendarMeta::contacts(&stream.calendar_name),
                IcsFileWriter::new(&stream.output_path),
            ),
        });
    }

    if let Some(stream) = settings.tasks.as_ref().filter(|_| selected(StreamKind::Tasks)) {
        let client = authorized(&client, &TokenFile::new(&stream.token_file), &clock)?;
        pipeline = pipeline.with_tasks(TasksJob {
            source: Box::new(GoogleTasksSource::new(client)),
            normalizer: TaskNormalizer::new(settings.timezone),
            synthesizer: TaskSynthesizer::new(stream.settings.clone()),
            reminders: settings.reminders.clone(),
            output: StreamOutput::new(
                CalendarMeta::tasks(&stream.calendar_name),
                IcsFileWriter::new(&stream.output_path),
            ),
        });
    }

    if let Some(stream) = settings.holidays.as_ref().filter(|_| selected(StreamKind::Holidays)) {
        pipeline = pipeline.with_holidays(HolidaysJob::with_files(
            Box::new(HolidayFeedSource::new(client.clone(), &stream.url)),
            HolidaySynthesizer::new(stream.settings.clone()),
            settings.reminders.clone(),
            stream.holidays.clone(),
            stream.festivals.clone(),
        ));
    }

    Ok(pipeline)
}

fn authorized(client: &HttpClient, token_file: &TokenFile, clock: &SystemClock) -> CliResult<HttpClient> {
    let token = token_file.load().map_err(|e| CliError::config(e.to_string()))?;
    token.warn_if_expired(token_file.path(), clock.now());
    Ok(client.clone().with_bearer(token.token))
}

/// Runs one synchronization and prints a per-stream summary.
pub async fn run(settings: &SyncSettings, only: Option<StreamKind>) -> CliResult<RunReport> {
    let pipeline = build_pipeline(settings, only)?;
    if pipeline.enabled().is_empty() {
        warn!("No stream is enabled, nothing to do");
        return Ok(RunReport::default());
    }

    info!(started_at = %Utc::now(), streams = ?pipeline.enabled(), "Sync requested");
    let report = pipeline.run(only).await;

    for stream in &report.streams {
        match &stream.outcome {
            StreamOutcome::Written { events, warnings } => {
                println!("{}: {} events written ({} warnings)", stream.kind, events, warnings)
            }
            StreamOutcome::Failed(e) => println!("{}: failed: {}", stream.kind, e),
        }
    }

    Ok(report)
}
