//! Course calendar feeds.
//!
//! A learning platform publishes one ICS feed per course. Each VEVENT in a
//! feed maps to a [`CourseEvent`]; feeds are fetched by the caller and
//! folded together with [`FeedReport::collect`], so one broken feed never
//! hides the others.

use std::fmt::Display;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::context::ProcessingContext;
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::CourseEvent;
use crate::ics::read_vevents;

/// Decode one feed document into course records.
///
/// Missing UIDs get a stable generated uid, missing summaries become
/// `"(No title)"` and a missing or unreadable DTSTART falls back to the
/// processing date.
pub fn decode_feed(content: &str, ctx: &ProcessingContext) -> ScheduleResult<Vec<CourseEvent>> {
    let records: Vec<CourseEvent> = read_vevents(content)?
        .into_iter()
        .enumerate()
        .map(|(index, fields)| CourseEvent {
            uid: fields.uid_or_generated(index),
            summary: fields.summary_or_untitled().to_string(),
            start: fields.start_or(ctx.processing_date()),
            end: fields.end.clone(),
            description: fields.description.clone(),
            url: fields.url.clone(),
        })
        .collect();

    debug!(count = records.len(), "decoded course feed");
    Ok(records)
}

#[derive(Deserialize)]
struct Course {
    #[serde(default)]
    calendar: Option<CourseCalendar>,
}

#[derive(Deserialize)]
struct CourseCalendar {
    #[serde(default)]
    ics: Option<String>,
}

/// Feed URLs from a course listing (`[{"calendar": {"ics": "…"}}, …]`).
///
/// Courses without a calendar are skipped. Other fields are ignored.
pub fn extract_calendar_urls(courses_json: &str) -> ScheduleResult<Vec<String>> {
    let courses: Vec<Course> = serde_json::from_str(courses_json)
        .map_err(|e| ScheduleError::Feed(format!("invalid course listing: {}", e)))?;

    Ok(courses
        .into_iter()
        .filter_map(|course| course.calendar.and_then(|c| c.ics))
        .filter(|url| !url.trim().is_empty())
        .collect())
}

/// A feed that contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFailure {
    pub source: String,
    pub reason: String,
}

/// Outcome of reading a set of course feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub events: Vec<CourseEvent>,
    pub succeeded: usize,
    pub failures: Vec<FeedFailure>,
}

impl FeedReport {
    /// Fold per-feed fetch results, keyed by where the feed came from.
    ///
    /// A feed that failed to fetch or decode is recorded in `failures` and
    /// contributes zero events.
    pub fn collect<I, E>(feeds: I, ctx: &ProcessingContext) -> Self
    where
        I: IntoIterator<Item = (String, Result<String, E>)>,
        E: Display,
    {
        let mut report = FeedReport::default();

        for (source, fetched) in feeds {
            let decoded = match fetched {
                Ok(content) => decode_feed(&content, ctx).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match decoded {
                Ok(events) => {
                    report.succeeded += 1;
                    report.events.extend(events);
                }
                Err(reason) => report.record_failure(source, reason),
            }
        }

        report
    }

    /// Note a source that contributed nothing, such as a course listing
    /// that could not be read.
    pub fn record_failure(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        let failure = FeedFailure {
            source: source.into(),
            reason: reason.into(),
        };
        warn!(source = %failure.source, reason = %failure.reason, "skipping course feed");
        self.failures.push(failure);
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
