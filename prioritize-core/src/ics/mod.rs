//! ICS document generation and parsing.
//!
//! This module handles reading and writing .ics files according to RFC 5545.
//! Provenance (source tag, week label) travels in `X-PRIORITIZE-*`
//! extension properties so a document read back yields the same events.

mod generate;
mod parse;

pub use generate::CalendarDocument;
pub use parse::parse_events;
pub(crate) use parse::read_vevents;

pub const PRODID: &str = "-//prioritize//schedule export//EN";
pub const SOURCE_PROPERTY: &str = "X-PRIORITIZE-SOURCE";
pub const WEEK_PROPERTY: &str = "X-PRIORITIZE-WEEK";
