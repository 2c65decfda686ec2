//! ICS parsing using the icalendar crate's parser.

use chrono::NaiveDate;
use icalendar::{
    DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use tracing::warn;
use uuid::Uuid;

use crate::context::ProcessingContext;
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{Event, EventSource, EventTime, UNTITLED};

use super::{SOURCE_PROPERTY, WEEK_PROPERTY};

/// Namespace for uids generated for VEVENTs that lack one.
const FEED_NAMESPACE: Uuid = Uuid::from_u128(0x0b9d_7e3a_1c45_4f62_8a1e_f03b_6d27_c594);

/// The VEVENT properties prioritize reads, before any defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VEventFields {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub url: Option<String>,
    pub source: Option<EventSource>,
    pub week_label: Option<String>,
}

impl VEventFields {
    /// The UID, or a stable one derived from position and content.
    pub fn uid_or_generated(&self, index: usize) -> String {
        match &self.uid {
            Some(uid) if !uid.trim().is_empty() => uid.clone(),
            _ => {
                let name = format!(
                    "{}\u{1f}{}\u{1f}{:?}",
                    index,
                    self.summary.as_deref().unwrap_or(""),
                    self.start
                );
                format!("{}@prioritize", Uuid::new_v5(&FEED_NAMESPACE, name.as_bytes()))
            }
        }
    }

    pub fn summary_or_untitled(&self) -> &str {
        self.summary.as_deref().unwrap_or(UNTITLED)
    }

    /// DTSTART, or `fallback` when it was missing or unreadable.
    pub fn start_or(&self, fallback: NaiveDate) -> EventTime {
        match &self.start {
            Some(start) => start.clone(),
            None => {
                warn!(
                    uid = self.uid.as_deref().unwrap_or(""),
                    %fallback,
                    "missing or unreadable DTSTART, using processing date"
                );
                EventTime::Date(fallback)
            }
        }
    }
}

/// Read every VEVENT of a calendar document.
pub(crate) fn read_vevents(content: &str) -> ScheduleResult<Vec<VEventFields>> {
    // Feeds sometimes answer with an HTML error page
    if !content
        .trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with("BEGIN:VCALENDAR")
    {
        return Err(ScheduleError::IcsParse(
            "document does not start with BEGIN:VCALENDAR".to_string(),
        ));
    }

    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| ScheduleError::IcsParse(e.to_string()))?;

    Ok(calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(vevent_fields)
        .collect())
}

/// Decode a calendar document into events.
///
/// Events written by prioritize get their source tag and week label back;
/// anything else is treated as an external course event. Unreadable
/// start dates fall back to the processing date.
pub fn parse_events(content: &str, ctx: &ProcessingContext) -> ScheduleResult<Vec<Event>> {
    let events = read_vevents(content)?
        .into_iter()
        .enumerate()
        .map(|(index, fields)| {
            Event::restore(
                fields.uid_or_generated(index),
                fields.summary_or_untitled(),
                &fields.description,
                fields.start_or(ctx.processing_date()),
                fields.end.clone(),
                fields.source.unwrap_or(EventSource::ExternalCourse),
                fields.week_label.clone(),
                fields.url.clone(),
            )
        })
        .collect();

    Ok(events)
}

fn vevent_fields(vevent: &Component) -> VEventFields {
    let start = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time);

    // DTEND is exclusive for dates; events keep the last day
    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)
        .map(|end| match end {
            EventTime::Date(d) => EventTime::Date(d.pred_opt().unwrap_or(d)),
            other => other,
        });

    let source = vevent.find_prop(SOURCE_PROPERTY).and_then(|p| {
        p.val
            .as_ref()
            .parse::<EventSource>()
            .inspect_err(|e| warn!("{}", e))
            .ok()
    });

    VEventFields {
        uid: vevent.find_prop("UID").map(|p| p.val.to_string()),
        summary: vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .filter(|s| !s.trim().is_empty()),
        description: vevent
            .find_prop("DESCRIPTION")
            .map(|p| p.val.to_string())
            .unwrap_or_default(),
        start,
        end,
        url: vevent.find_prop("URL").map(|p| p.val.to_string()),
        source,
        week_label: vevent.find_prop(WEEK_PROPERTY).map(|p| p.val.to_string()),
    }
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    }
}
