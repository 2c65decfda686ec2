//! Source-neutral event types.
//!
//! Every producer (the report parser, course calendar feeds and ad-hoc
//! tasks entered by the user) converts its input into an [`Event`]. The rest
//! of the crate (aggregation, display, ICS generation) works exclusively with
//! this type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title used when a producer supplies an empty one.
pub const UNTITLED: &str = "(No title)";

/// A calendar event.
///
/// Fields are private so the invariants established by the constructors
/// (non-empty title, `end >= start`) cannot be broken afterwards. A
/// correction is a new event, see [`Event::with_uid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    uid: String,
    title: String,
    description: String,
    start: EventTime,
    /// Inclusive. For date-valued events this is the last day of the event.
    end: EventTime,
    source: EventSource,
    week_label: Option<String>,
    url: Option<String>,
}

/// Which producer created an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSource {
    ParsedSchedule,
    ExternalCourse,
    AdHoc,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::ParsedSchedule => "parsed-schedule",
            EventSource::ExternalCourse => "external-course",
            EventSource::AdHoc => "ad-hoc",
        }
    }

    /// Position of the producer in the default output order:
    /// external courses, then ad-hoc tasks, then the parsed schedule.
    pub fn producer_rank(&self) -> u8 {
        match self {
            EventSource::ExternalCourse => 0,
            EventSource::AdHoc => 1,
            EventSource::ParsedSchedule => 2,
        }
    }
}

impl FromStr for EventSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parsed-schedule" => Ok(EventSource::ParsedSchedule),
            "external-course" => Ok(EventSource::ExternalCourse),
            "ad-hoc" => Ok(EventSource::AdHoc),
            other => Err(format!("Unknown event source '{}'", other)),
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Calendar date of this time, as written in the source.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTimeUtc(dt) => dt.date_naive(),
            EventTime::DateTimeFloating(dt) => dt.date(),
            EventTime::DateTimeZoned { datetime, .. } => datetime.date(),
        }
    }

    /// Key used to order mixed variants.
    ///
    /// Dates sort at midnight and floating times are taken as UTC. Zoned
    /// times are resolved through the tz database; an unknown TZID is
    /// treated like a floating time.
    pub fn sort_key(&self) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            EventTime::DateTimeUtc(dt) => dt.naive_utc(),
            EventTime::DateTimeFloating(dt) => *dt,
            EventTime::DateTimeZoned { datetime, tzid } => tzid
                .parse::<chrono_tz::Tz>()
                .ok()
                .and_then(|tz| tz.from_local_datetime(datetime).earliest())
                .map(|dt| dt.naive_utc())
                .unwrap_or(*datetime),
        }
    }

    /// ISO-8601 rendering: `YYYY-MM-DD` for dates, RFC 3339 for UTC and
    /// zoned times, and a naive `YYYY-MM-DDTHH:MM:SS` for floating times.
    pub fn to_iso_string(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y-%m-%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.to_rfc3339(),
            EventTime::DateTimeFloating(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            EventTime::DateTimeZoned { datetime, tzid } => tzid
                .parse::<chrono_tz::Tz>()
                .ok()
                .and_then(|tz| tz.from_local_datetime(datetime).earliest())
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| datetime.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} {}", datetime.format("%Y-%m-%d %H:%M"), tzid)
            }
        }
    }
}

/// A record decoded from a course calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEvent {
    pub uid: String,
    pub summary: String,
    pub start: EventTime,
    pub end: Option<EventTime>,
    #[serde(default)]
    pub description: String,
    pub url: Option<String>,
}

/// A task entered directly by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdHocTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
}

impl Event {
    /// Schedule-report event. Only the report parser builds these.
    pub(crate) fn parsed(
        uid: String,
        title: &str,
        description: &str,
        due: NaiveDate,
        week_label: Option<String>,
    ) -> Self {
        Self::assemble(
            uid,
            title,
            description,
            EventTime::Date(due),
            None,
            EventSource::ParsedSchedule,
            week_label,
            None,
        )
    }

    /// Map a course feed record. An absent `end` defaults to `start`.
    pub fn from_course(record: CourseEvent) -> Self {
        let uid = if record.uid.trim().is_empty() {
            generate_uid()
        } else {
            record.uid
        };

        Self::assemble(
            uid,
            &record.summary,
            &record.description,
            record.start,
            record.end,
            EventSource::ExternalCourse,
            None,
            record.url,
        )
    }

    /// Map an ad-hoc task onto an all-day event on its due date.
    pub fn ad_hoc(task: AdHocTask) -> Self {
        Self::assemble(
            generate_uid(),
            &task.title,
            &task.description,
            EventTime::Date(task.due_date),
            None,
            EventSource::AdHoc,
            None,
            None,
        )
    }

    /// Restore an event read back from an ICS document.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        uid: String,
        title: &str,
        description: &str,
        start: EventTime,
        end: Option<EventTime>,
        source: EventSource,
        week_label: Option<String>,
        url: Option<String>,
    ) -> Self {
        Self::assemble(uid, title, description, start, end, source, week_label, url)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        uid: String,
        title: &str,
        description: &str,
        start: EventTime,
        end: Option<EventTime>,
        source: EventSource,
        week_label: Option<String>,
        url: Option<String>,
    ) -> Self {
        let title = title.trim();
        let title = if title.is_empty() { UNTITLED } else { title };

        // DTSTART and DTEND must share a value type
        let end = end.map(|end| match (&start, end) {
            (EventTime::Date(_), end) if !end.is_all_day() => EventTime::Date(end.date()),
            (start, EventTime::Date(d)) if !start.is_all_day() => {
                EventTime::DateTimeFloating(d.and_time(chrono::NaiveTime::MIN))
            }
            (_, end) => end,
        });

        let end = match end {
            Some(end) if end.sort_key() < start.sort_key() => {
                tracing::debug!(uid = %uid, "end before start, clamping to start");
                start.clone()
            }
            Some(end) => end,
            None => start.clone(),
        };

        // Week labels only group parsed-schedule events
        let week_label = week_label.filter(|_| source == EventSource::ParsedSchedule);

        Event {
            uid,
            title: title.to_string(),
            description: description.to_string(),
            start,
            end,
            source,
            week_label,
            url: url.filter(|u| !u.is_empty()),
        }
    }

    /// A copy of this event under a different uid.
    pub fn with_uid(&self, uid: impl Into<String>) -> Self {
        Event {
            uid: uid.into(),
            ..self.clone()
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(&self) -> &EventTime {
        &self.start
    }

    pub fn end(&self) -> &EventTime {
        &self.end
    }

    pub fn source(&self) -> EventSource {
        self.source
    }

    pub fn week_label(&self) -> Option<&str> {
        self.week_label.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

fn generate_uid() -> String {
    format!("{}@prioritize", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn course(uid: &str) -> CourseEvent {
        CourseEvent {
            uid: uid.to_string(),
            summary: "Quiz 3".to_string(),
            start: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap()),
            end: None,
            description: String::new(),
            url: None,
        }
    }

    #[test]
    fn course_event_without_end_defaults_to_start() {
        let event = Event::from_course(course("quiz-3@canvas"));

        assert_eq!(event.source(), EventSource::ExternalCourse);
        assert_eq!(event.uid(), "quiz-3@canvas");
        assert_eq!(event.end(), event.start());
        assert_eq!(event.week_label(), None);
    }

    #[test]
    fn end_before_start_is_clamped() {
        let mut record = course("quiz-3@canvas");
        record.end = Some(EventTime::DateTimeUtc(
            Utc.with_ymd_and_hms(2025, 3, 19, 9, 0, 0).unwrap(),
        ));

        let event = Event::from_course(record);

        assert_eq!(event.end(), event.start());
    }

    #[test]
    fn mixed_end_takes_the_start_value_type() {
        let mut record = course("exam@canvas");
        record.start = EventTime::Date(date(2025, 3, 20));
        record.end = Some(EventTime::DateTimeUtc(
            Utc.with_ymd_and_hms(2025, 3, 22, 10, 0, 0).unwrap(),
        ));

        let event = Event::from_course(record);

        assert_eq!(event.end(), &EventTime::Date(date(2025, 3, 22)));
    }

    #[test]
    fn constructed_event_serializes_its_invariants() {
        let mut record = course("quiz-3@canvas");
        record.summary = "  ".to_string();
        let json = serde_json::to_value(Event::from_course(record)).unwrap();

        assert_eq!(json["title"], UNTITLED);
        assert_eq!(json["start"], json["end"]);
        assert_eq!(json["source"], "external-course");
    }

    #[test]
    fn empty_course_uid_is_generated() {
        let event = Event::from_course(course("  "));
        assert!(event.uid().ends_with("@prioritize"));
    }

    #[test]
    fn empty_title_becomes_untitled() {
        let event = Event::ad_hoc(AdHocTask {
            title: "   ".to_string(),
            description: String::new(),
            due_date: date(2025, 3, 5),
        });

        assert_eq!(event.title(), UNTITLED);
        assert!(event.is_all_day());
        assert_eq!(event.source(), EventSource::AdHoc);
    }

    #[test]
    fn with_uid_replaces_only_the_uid() {
        let event = Event::from_course(course("a"));
        let renamed = event.with_uid("a-2");

        assert_eq!(renamed.uid(), "a-2");
        assert_eq!(renamed.title(), event.title());
        assert_eq!(renamed.start(), event.start());
    }

    #[test]
    fn sort_key_orders_mixed_variants() {
        let day = EventTime::Date(date(2025, 3, 20));
        let morning = EventTime::DateTimeFloating(date(2025, 3, 20).and_hms_opt(9, 0, 0).unwrap());
        let zoned = EventTime::DateTimeZoned {
            datetime: date(2025, 3, 20).and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            tzid: "America/Chicago".to_string(),
        };

        assert!(day.sort_key() < morning.sort_key());
        // 09:00 in Chicago is 14:00 UTC
        assert_eq!(
            zoned.sort_key(),
            date(2025, 3, 20).and_hms_opt(14, 0, 0).unwrap()
        );
    }

    #[test]
    fn iso_strings() {
        assert_eq!(EventTime::Date(date(2025, 3, 5)).to_iso_string(), "2025-03-05");
        assert_eq!(
            EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2025, 3, 5, 8, 30, 0).unwrap())
                .to_iso_string(),
            "2025-03-05T08:30:00+00:00"
        );
    }

    #[test]
    fn source_round_trips_through_str() {
        for source in [
            EventSource::ParsedSchedule,
            EventSource::ExternalCourse,
            EventSource::AdHoc,
        ] {
            assert_eq!(source.as_str().parse::<EventSource>(), Ok(source));
        }
        assert!("calendar".parse::<EventSource>().is_err());
    }
}
