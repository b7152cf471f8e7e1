//! ICS parsing for holiday feeds and previously written output.

use chrono::NaiveDate;
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event};
use tracing::debug;

use calengine_core::SpecialDay;

use crate::error::{ProviderError, ProviderResult};
use crate::raw::RawHoliday;

/// Property carrying the statutory work-holiday / alternate-workday marker.
pub const SPECIAL_DAY_PROPERTY: &str = "X-APPLE-SPECIAL-DAY";

/// Parses every VEVENT in `ics` into a [`RawHoliday`].
///
/// Only a document that is not iCalendar at all is an error. Events missing a
/// start date or summary are returned with those fields empty.
pub fn parse_holiday_events(ics: &str) -> ProviderResult<Vec<RawHoliday>> {
    if !ics.trim_start().starts_with("BEGIN:VCALENDAR") {
        return Err(ProviderError::invalid_response("content is not an iCalendar document"));
    }

    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse ICS content: {}", e)))?;

    let events: Vec<RawHoliday> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(parse_event(event)),
            _ => None,
        })
        .collect();

    debug!(events = events.len(), "parsed ICS events");
    Ok(events)
}

fn parse_event(event: &Event) -> RawHoliday {
    let special_day = event
        .property_value(SPECIAL_DAY_PROPERTY)
        .and_then(SpecialDay::parse);

    RawHoliday {
        uid: event.get_uid().map(String::from),
        date: event.get_start().map(start_date),
        summary: event
            .get_summary()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        special_day,
    }
}

/// The calendar date an event starts on, ignoring any time of day.
fn start_date(start: DatePerhapsTime) -> NaiveDate {
    match start {
        DatePerhapsTime::Date(date) => date,
        DatePerhapsTime::DateTime(cdt) => match cdt {
            CalendarDateTime::Utc(dt) => dt.date_naive(),
            CalendarDateTime::Floating(naive) => naive.date(),
            CalendarDateTime::WithTimezone { date_time, tzid: _ } => date_time.date(),
        },
    }
}
