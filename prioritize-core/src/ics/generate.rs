//! ICS document generation.

use std::collections::HashSet;

use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{Event, EventTime};
use icalendar::{Calendar, Component, Property, ValueType};

use super::{PRODID, SOURCE_PROPERTY, WEEK_PROPERTY};

/// A calendar built from a collection of events, ready to serialize.
#[derive(Debug, Clone)]
pub struct CalendarDocument {
    calendar: Calendar,
    len: usize,
}

impl CalendarDocument {
    /// Build a document with one VEVENT per event.
    ///
    /// An empty or repeated uid means a producer broke the event invariants;
    /// that is reported as [`ScheduleError::InvalidEvent`] and no document is
    /// built.
    pub fn build<'a>(events: impl IntoIterator<Item = &'a Event>) -> ScheduleResult<Self> {
        Self::build_named(None, events)
    }

    /// Like [`CalendarDocument::build`], with a calendar display name.
    pub fn build_named<'a>(
        name: Option<&str>,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> ScheduleResult<Self> {
        let mut cal = Calendar::new();
        if let Some(name) = name {
            cal.name(name);
        }

        let mut uids = HashSet::new();
        for event in events {
            if event.uid().trim().is_empty() {
                return Err(ScheduleError::InvalidEvent(format!(
                    "event '{}' has an empty uid",
                    event.title()
                )));
            }
            if !uids.insert(event.uid()) {
                return Err(ScheduleError::InvalidEvent(format!(
                    "uid '{}' appears more than once",
                    event.uid()
                )));
            }

            cal.push(to_ics_event(event));
        }

        Ok(CalendarDocument {
            calendar: cal.done(),
            len: uids.len(),
        })
    }

    /// Number of VEVENT components.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Render as RFC 5545 text (UTF-8, CRLF line endings).
    pub fn serialize(&self) -> Vec<u8> {
        strip_ics_bloat(&self.calendar.to_string()).into_bytes()
    }
}

fn to_ics_event(event: &Event) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(event.uid());
    ics_event.summary(event.title());
    if !event.description().is_empty() {
        ics_event.description(event.description());
    }

    // DTSTAMP - required by RFC 5545
    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    add_datetime_property(&mut ics_event, "DTSTART", event.start());

    // A single-day or instant event has no DTEND
    if event.end() != event.start() {
        match event.end() {
            // DTEND is exclusive for dates, our end is the last day
            EventTime::Date(d) => {
                let next = d.succ_opt().unwrap_or(*d);
                add_datetime_property(&mut ics_event, "DTEND", &EventTime::Date(next));
            }
            end => add_datetime_property(&mut ics_event, "DTEND", end),
        }
    }

    if let Some(url) = event.url() {
        ics_event.add_property("URL", url);
    }

    ics_event.add_property(SOURCE_PROPERTY, event.source().as_str());
    if let Some(week) = event.week_label() {
        ics_event.add_property(WEEK_PROPERTY, week);
    }

    ics_event.done()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add a datetime property with proper formatting based on EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
        EventTime::DateTimeFloating(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
        }
        EventTime::DateTimeZoned { datetime, tzid } => {
            let mut prop = Property::new(name, datetime.format("%Y%m%dT%H%M%S").to_string());
            prop.add_parameter("TZID", tzid);
            ics_event.append_property(prop);
        }
    }
}
