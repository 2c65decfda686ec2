//! Schedule report parsing.
//!
//! A report is the text returned by the schedule generator. It is grouped
//! into week sections, each holding event blocks of three lines:
//!
//! ```text
//! Week 1:
//! 1. **Finish report**
//!    - **Description:** Draft outline
//!    - **Due Date:** March 5, 2025
//! ```
//!
//! The generator is usually but not always well-formed, so the parser never
//! fails. A block with a missing or broken line still yields an event, with
//! a default standing in for the bad line and a [`Fallback`] recording it.

mod date;

pub use date::parse_due_date;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ProcessingContext;
use crate::event::Event;

/// Description used when a block has no `Description:` line.
pub const DEFAULT_DESCRIPTION: &str = "No description provided.";

const DESCRIPTION_LABEL: &str = "Description";
const DUE_DATE_LABEL: &str = "Due Date";

/// Namespace for parsed-schedule uids (UUIDv5), so equal reports give equal uids.
const SCHEDULE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b8e_93d4_4a51_b7e0_5c3a_d2f4_8e19);

/// Unparsed text from the schedule generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport(String);

impl RawReport {
    pub fn new(text: impl Into<String>) -> Self {
        RawReport(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawReport {
    fn from(text: String) -> Self {
        RawReport(text)
    }
}

impl From<&str> for RawReport {
    fn from(text: &str) -> Self {
        RawReport(text.to_string())
    }
}

/// A default that replaced a missing or malformed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "kebab-case")]
pub enum Fallback {
    MissingDescription,
    MissingDueDate,
    UnparseableDueDate(String),
}

/// An event read from a report, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEvent {
    event: Event,
    /// 1-based line number of the title line
    line: usize,
    fallbacks: Vec<Fallback>,
}

impl ParsedEvent {
    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn into_event(self) -> Event {
        self.event
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        &self.fallbacks
    }

    pub fn is_degraded(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

#[derive(Debug)]
enum ScanState {
    /// No week header seen yet
    Seeking,
    WeekSet(String),
    Done,
}

impl ScanState {
    fn week_label(&self) -> Option<&str> {
        match self {
            ScanState::WeekSet(label) => Some(label),
            _ => None,
        }
    }
}

enum Line<'a> {
    WeekHeader(&'a str),
    Title(&'a str),
    Other,
}

/// Line-oriented state machine over a [`RawReport`].
pub struct ReportParser<'a> {
    ctx: &'a ProcessingContext,
}

impl<'a> ReportParser<'a> {
    pub fn new(ctx: &'a ProcessingContext) -> Self {
        ReportParser { ctx }
    }

    /// Parse a report into events, in report order.
    ///
    /// Never fails. Returns at most one event per title line.
    pub fn parse(&self, report: &RawReport) -> Vec<ParsedEvent> {
        let lines: Vec<&str> = report.as_str().lines().collect();
        let mut events = Vec::new();
        let mut state = ScanState::Seeking;
        let mut cursor = 0;

        while !matches!(state, ScanState::Done) {
            let Some(line) = lines.get(cursor) else {
                state = ScanState::Done;
                continue;
            };

            match classify(line) {
                Line::WeekHeader(label) => {
                    debug!(line = cursor + 1, label, "week section");
                    state = ScanState::WeekSet(label.to_string());
                    cursor += 1;
                }
                Line::Title(title) => {
                    let (event, consumed) =
                        self.read_block(&lines, cursor, title, state.week_label(), events.len());
                    events.push(event);
                    cursor += 1 + consumed;
                }
                Line::Other => cursor += 1,
            }
        }

        let degraded = events.iter().filter(|e| e.is_degraded()).count();
        info!(events = events.len(), degraded, "parsed schedule report");

        events
    }

    /// Build the event for the title at `title_index`.
    ///
    /// Returns the event and how many following lines it consumed. Only
    /// lines that carry the expected label are consumed; anything else is
    /// left for the main loop to scan.
    fn read_block(
        &self,
        lines: &[&str],
        title_index: usize,
        title: &str,
        week_label: Option<&str>,
        ordinal: usize,
    ) -> (ParsedEvent, usize) {
        let line = title_index + 1;
        let mut fallbacks = Vec::new();
        let mut next = title_index + 1;

        let labelled = lines.get(next).and_then(|l| label_value(l, DESCRIPTION_LABEL));
        let description = match labelled {
            Some(text) => {
                next += 1;
                text
            }
            None => {
                warn!(line, title, "missing description, using default");
                fallbacks.push(Fallback::MissingDescription);
                DEFAULT_DESCRIPTION
            }
        };

        // The due date sits at title+2. Without a description it may also
        // have moved up to title+1.
        let due_line = due_date_at(lines, next).map(|text| (text, next)).or_else(|| {
            let skipped = lines.get(next)?;
            if labelled.is_some() || !matches!(classify(skipped), Line::Other) {
                return None;
            }
            due_date_at(lines, next + 1).map(|text| (text, next + 1))
        });

        let due = match due_line {
            Some((text, index)) => {
                next = index + 1;
                parse_due_date(text, self.ctx).unwrap_or_else(|| {
                    warn!(line, title, due = text, "unparseable due date, using processing date");
                    fallbacks.push(Fallback::UnparseableDueDate(text.to_string()));
                    self.ctx.processing_date()
                })
            }
            None => {
                warn!(line, title, "missing due date, using processing date");
                fallbacks.push(Fallback::MissingDueDate);
                self.ctx.processing_date()
            }
        };

        let uid = block_uid(ordinal, week_label, title);
        debug!(line, title, %due, "schedule block");

        let event = Event::parsed(
            uid,
            title,
            description,
            due,
            week_label.map(str::to_string),
        );

        let consumed = next - title_index - 1;
        (
            ParsedEvent {
                event,
                line,
                fallbacks,
            },
            consumed,
        )
    }
}

/// Parse a report with a fresh parser.
pub fn parse_report(report: &RawReport, ctx: &ProcessingContext) -> Vec<ParsedEvent> {
    ReportParser::new(ctx).parse(report)
}

fn block_uid(ordinal: usize, week_label: Option<&str>, title: &str) -> String {
    let name = format!("{}\u{1f}{}\u{1f}{}", ordinal, week_label.unwrap_or(""), title);
    format!(
        "{}@prioritize",
        Uuid::new_v5(&SCHEDULE_NAMESPACE, name.as_bytes())
    )
}

fn classify(line: &str) -> Line<'_> {
    if let Some(label) = week_header(line) {
        return Line::WeekHeader(label);
    }
    if let Some(title) = title_text(line) {
        return Line::Title(title);
    }
    Line::Other
}

/// `Week 1:` or `## Week 1` -> the label. `Weekly review` is not a header.
fn week_header(line: &str) -> Option<&str> {
    let label = line.trim().trim_start_matches('#').trim_start();
    let rest = label.strip_prefix("Week")?;

    match rest.chars().next() {
        Some(c) if c.is_alphabetic() => None,
        _ => Some(label),
    }
}

fn due_date_at<'a>(lines: &[&'a str], index: usize) -> Option<&'a str> {
    lines.get(index).and_then(|l| label_value(l, DUE_DATE_LABEL))
}

/// `1. **Finish report** (3 hours)` -> `Finish report`
///
/// Text after the closing `**` is ignored. Without a closing marker the
/// rest of the line is the title.
fn title_text(line: &str) -> Option<&str> {
    if label_value(line, DESCRIPTION_LABEL).is_some() || label_value(line, DUE_DATE_LABEL).is_some()
    {
        return None;
    }

    let content = strip_list_marker(line.trim());
    let rest = content.strip_prefix("**")?;
    let inner = match rest.find("**") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(inner.trim())
}

/// Value of a `Label: value` line, tolerating list markers and bold markup
/// around the label (`- **Due Date:** ...`, `**Due Date**: ...`).
fn label_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let content = strip_list_marker(line.trim());
    let content = content.trim_start_matches('*').trim_start();

    let head = content.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }

    let rest = content[label.len()..].trim_start_matches('*');
    let value = rest.strip_prefix(':')?;
    Some(value.trim_start_matches('*').trim())
}

/// Strip one leading `1.`, `1)`, `-`, `*`, `+` or `•` list marker.
fn strip_list_marker(s: &str) -> &str {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &s[digits..];
        return match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            Some(rest) => rest.trim_start(),
            None => s,
        };
    }

    ["- ", "* ", "+ ", "• "]
        .iter()
        .find_map(|marker| s.strip_prefix(marker))
        .map(str::trim_start)
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventSource, EventTime};
    use chrono::NaiveDate;
    use indoc::indoc;

    fn ctx() -> ProcessingContext {
        ProcessingContext::new(processing_date())
    }

    fn processing_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn parse(text: &str) -> Vec<ParsedEvent> {
        parse_report(&RawReport::from(text), &ctx())
    }

    #[test]
    fn single_well_formed_block() {
        let events = parse(
            "Week 1:\n1. **Finish report**\n   - **Description:** Draft outline\n   - **Due Date:** March 5, 2025\n",
        );

        assert_eq!(events.len(), 1);
        let parsed = &events[0];
        let event = parsed.event();
        assert_eq!(event.title(), "Finish report");
        assert_eq!(event.description(), "Draft outline");
        assert_eq!(
            event.start(),
            &EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
        );
        assert_eq!(event.end(), event.start());
        assert_eq!(event.week_label(), Some("Week 1:"));
        assert_eq!(event.source(), EventSource::ParsedSchedule);
        assert_eq!(parsed.line(), 2);
        assert!(!parsed.is_degraded());
    }

    #[test]
    fn bad_due_date_falls_back_to_processing_date() {
        let events = parse(indoc! {"
            Week 1:
            1. **Finish report**
               - **Description:** Draft outline
               - **Due Date:** not-a-date
        "});

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().start(), &EventTime::Date(processing_date()));
        assert_eq!(
            events[0].fallbacks(),
            &[Fallback::UnparseableDueDate("not-a-date".to_string())]
        );
    }

    #[test]
    fn missing_lines_use_defaults_at_end_of_input() {
        let events = parse("Week 2:\n**Read chapter 4**");

        assert_eq!(events.len(), 1);
        let event = events[0].event();
        assert_eq!(event.description(), DEFAULT_DESCRIPTION);
        assert_eq!(event.start(), &EventTime::Date(processing_date()));
        assert_eq!(
            events[0].fallbacks(),
            &[Fallback::MissingDescription, Fallback::MissingDueDate]
        );
    }

    #[test]
    fn missing_description_still_reads_due_date() {
        let events = parse(indoc! {"
            Week 1:
            1. **Lab 2**
               - **Due Date:** March 7, 2025
        "});

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().description(), DEFAULT_DESCRIPTION);
        assert_eq!(
            events[0].event().start(),
            &EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap())
        );
        assert_eq!(events[0].fallbacks(), &[Fallback::MissingDescription]);
    }

    #[test]
    fn due_date_is_read_from_its_fixed_line_without_description() {
        let events = parse(
            "Week 1:\n1. **Lab**\n   (see syllabus)\n   - **Due Date:** March 5, 2025\n",
        );

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event().start(),
            &EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
        );
        assert_eq!(events[0].event().description(), DEFAULT_DESCRIPTION);
        assert_eq!(events[0].fallbacks(), &[Fallback::MissingDescription]);
    }

    #[test]
    fn unlabelled_line_before_a_title_is_not_skipped_over() {
        let events = parse(indoc! {"
            Week 1:
            1. **Lab**
            2. **Essay**
               - **Due Date:** March 9, 2025
        "});

        let titles: Vec<_> = events.iter().map(|e| e.event().title()).collect();
        assert_eq!(titles, vec!["Lab", "Essay"]);
        assert_eq!(events[0].event().start(), &EventTime::Date(processing_date()));
    }

    #[test]
    fn title_with_trailing_text() {
        let events = parse(indoc! {"
            Week 1:
            1. **Finish report** (3 hours)
               - **Description:** Draft outline
               - **Due Date:** March 5, 2025
            2. **Read chapter 4**:
               - **Description:** Skim the summary
               - **Due Date:** March 6, 2025
        "});

        let titles: Vec<_> = events.iter().map(|e| e.event().title()).collect();
        assert_eq!(titles, vec!["Finish report", "Read chapter 4"]);
        assert!(events.iter().all(|e| !e.is_degraded()));
        assert_eq!(events[1].event().description(), "Skim the summary");
    }

    #[test]
    fn unclosed_bold_title_is_kept() {
        let events = parse("Week 1:\n**Quiz prep\n- **Description:** Flashcards\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().title(), "Quiz prep");
        assert_eq!(events[0].event().description(), "Flashcards");
    }

    #[test]
    fn short_block_does_not_swallow_next_title() {
        let events = parse(indoc! {"
            Week 1:
            1. **Lab 2**
            2. **Lab 3**
               - **Description:** Circuits
               - **Due Date:** March 9, 2025
        "});

        let titles: Vec<_> = events.iter().map(|e| e.event().title()).collect();
        assert_eq!(titles, vec!["Lab 2", "Lab 3"]);
        assert_eq!(events[1].event().description(), "Circuits");
        assert!(!events[1].is_degraded());
    }

    #[test]
    fn malformed_block_keeps_the_others() {
        let events = parse(indoc! {"
            Week 1:
            1. **Essay draft**
               - **Description:** 500 words
               - **Due Date:** March 3, 2025
            2. **Problem set**
               - **Description:** Chapter 2
               - **Due Date:** sometime soon
            Week 2:
            1. **Quiz prep**
               - **Description:** Flashcards
               - **Due Date:** March 10, 2025
            2. **Presentation**
               - **Description:** Slides
               - **Due Date:** March 12, 2025
        "});

        assert_eq!(events.len(), 4);
        assert_eq!(events.iter().filter(|e| e.is_degraded()).count(), 1);
        assert_eq!(events[1].event().start(), &EventTime::Date(processing_date()));
        assert_eq!(events[2].event().week_label(), Some("Week 2:"));
        assert_eq!(events[3].event().week_label(), Some("Week 2:"));
    }

    #[test]
    fn title_before_any_week_header_is_kept() {
        let events = parse(indoc! {"
            Here is your schedule:
            **Orientation**
            - **Description:** Campus tour
            - **Due Date:** March 1, 2025
        "});

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().week_label(), None);
        assert_eq!(events[0].event().title(), "Orientation");
    }

    #[test]
    fn consumed_lines_are_not_rescanned() {
        // The description value is itself bold-wrapped
        let events = parse(indoc! {"
            Week 1:
            1. **Reading**
               - **Description:** **Chapters 1-3**
               - **Due Date:** March 4, 2025
        "});

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().description(), "**Chapters 1-3**");
    }

    #[test]
    fn label_variants() {
        let events = parse(indoc! {"
            ## Week 3
            - **Midterm**
              **Description**: Units 1-4
              Due Date: March 20, 2025
        "});

        assert_eq!(events.len(), 1);
        let event = events[0].event();
        assert_eq!(event.week_label(), Some("Week 3"));
        assert_eq!(event.description(), "Units 1-4");
        assert_eq!(
            event.start(),
            &EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap())
        );
    }

    #[test]
    fn weekly_is_not_a_week_header() {
        let events = parse(indoc! {"
            Week 1:
            Weekly goals are below.
            **Review notes**
        "});

        assert_eq!(events[0].event().week_label(), Some("Week 1:"));
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = indoc! {"
            Week 1:
            1. **Finish report**
               - **Description:** Draft outline
               - **Due Date:** March 5, 2025
            2. **Finish report**
               - **Description:** Final copy
               - **Due Date:** March 6, 2025
        "};

        let first = parse(text);
        let second = parse(text);

        assert_eq!(first, second);
        // Same title twice in one report still gets two uids
        assert_ne!(first[0].event().uid(), first[1].event().uid());
    }

    #[test]
    fn never_more_events_than_title_lines() {
        let inputs = [
            "",
            "\n\n\n",
            "**",
            "****",
            "Week",
            "- **Due Date:**",
            "**Description:** orphan",
            "1. **a**\n2. **b**\n3. **c**",
            "Week 1:\n**x**\n- **Description:**\n- **Due Date:**\n**y**",
            "• **ünïcödé**\n- **Description:** ✓\n- **Due Date:** 3月5日",
        ];

        for input in inputs {
            let titles = input.lines().filter(|l| title_text(l).is_some()).count();
            assert!(parse(input).len() <= titles, "input: {:?}", input);
        }
    }

    #[test]
    fn empty_bold_title_becomes_untitled() {
        let events = parse("****");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().title(), crate::event::UNTITLED);
    }
}
