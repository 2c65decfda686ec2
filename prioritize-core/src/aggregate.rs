//! Merging producers into one display collection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::event::{Event, EventSource};
use crate::report::ParsedEvent;

/// Order of an aggregated collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// External courses, then ad-hoc tasks, then the parsed schedule
    #[default]
    Producer,
    /// By start; equal starts keep producer order
    Chronological,
}

/// Display color, fixed per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
}

impl From<EventSource> for Color {
    fn from(source: EventSource) -> Self {
        match source {
            EventSource::ExternalCourse => Color::Red,
            EventSource::AdHoc => Color::Blue,
            EventSource::ParsedSchedule => Color::Green,
        }
    }
}

/// An event ready for rendering: a color and ISO-8601 start/end strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    event: Event,
    color: Color,
    start: String,
    end: String,
}

impl DisplayEvent {
    fn new(event: Event) -> Self {
        DisplayEvent {
            color: Color::from(event.source()),
            start: event.start().to_iso_string(),
            end: event.end().to_iso_string(),
            event,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// Event object in the shape calendar widgets (FullCalendar) consume.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetEvent<'a> {
    id: &'a str,
    title: &'a str,
    start: &'a str,
    end: &'a str,
    color: Color,
    all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    extended_props: WidgetProps<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetProps<'a> {
    description: &'a str,
    source: EventSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    week_label: Option<&'a str>,
}

impl Serialize for DisplayEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WidgetEvent {
            id: self.event.uid(),
            title: self.event.title(),
            start: &self.start,
            end: &self.end,
            color: self.color,
            all_day: self.event.is_all_day(),
            url: self.event.url(),
            extended_props: WidgetProps {
                description: self.event.description(),
                source: self.event.source(),
                week_label: self.event.week_label(),
            },
        }
        .serialize(serializer)
    }
}

/// Result of one aggregation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    events: Vec<DisplayEvent>,
    renamed: usize,
}

impl Aggregation {
    pub fn display_events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// The underlying events, in display order. Uids are unique.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(DisplayEvent::event)
    }

    /// How many events got a suffixed uid because of a collision.
    pub fn renamed(&self) -> usize {
        self.renamed
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventAggregator {
    order: SortOrder,
}

impl EventAggregator {
    pub fn new(order: SortOrder) -> Self {
        EventAggregator { order }
    }

    /// Merge the three producers into one collection.
    ///
    /// Nothing is dropped: the output holds exactly as many events as the
    /// inputs. When two events share a uid, the later one (in producer
    /// order) is re-issued under `<uid>-N` with the first free `N >= 2`.
    pub fn aggregate(
        &self,
        parsed: &[ParsedEvent],
        external: &[Event],
        adhoc: &[Event],
    ) -> Aggregation {
        let producer_order = external
            .iter()
            .chain(adhoc)
            .chain(parsed.iter().map(ParsedEvent::event));

        let mut seen: HashSet<String> = HashSet::new();
        let mut renamed = 0;
        let mut events: Vec<Event> = Vec::with_capacity(external.len() + adhoc.len() + parsed.len());

        for event in producer_order {
            let event = if seen.contains(event.uid()) {
                let uid = unique_uid(event.uid(), &seen);
                warn!(uid = event.uid(), renamed_to = %uid, "duplicate uid");
                renamed += 1;
                event.with_uid(uid)
            } else {
                event.clone()
            };

            seen.insert(event.uid().to_string());
            events.push(event);
        }

        if self.order == SortOrder::Chronological {
            // Stable, so equal keys keep producer order
            events.sort_by(|a, b| {
                a.start()
                    .sort_key()
                    .cmp(&b.start().sort_key())
                    .then(a.source().producer_rank().cmp(&b.source().producer_rank()))
            });
        }

        info!(
            external = external.len(),
            adhoc = adhoc.len(),
            parsed = parsed.len(),
            renamed,
            "aggregated events"
        );

        Aggregation {
            events: events.into_iter().map(DisplayEvent::new).collect(),
            renamed,
        }
    }
}

fn unique_uid(base: &str, seen: &HashSet<String>) -> String {
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !seen.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
