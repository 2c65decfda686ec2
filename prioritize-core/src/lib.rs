//! Core types for prioritize.
//!
//! This crate turns a weekly schedule report into calendar events, merges
//! them with course feeds and ad-hoc tasks, and writes the result as an
//! iCalendar document:
//! - `report` parses schedule reports
//! - `feed` decodes course calendar feeds
//! - `aggregate` merges producers into one display collection
//! - `ics` reads and writes RFC 5545 documents

pub mod aggregate;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod export;
pub mod feed;
pub mod ics;
pub mod report;

pub use aggregate::{Aggregation, Color, DisplayEvent, EventAggregator, SortOrder};
pub use config::PrioritizeConfig;
pub use context::ProcessingContext;
pub use error::{ScheduleError, ScheduleResult};
pub use event::{AdHocTask, CourseEvent, Event, EventSource, EventTime};
pub use export::CalendarExport;
pub use feed::{FeedFailure, FeedReport};
pub use ics::CalendarDocument;
pub use report::{Fallback, ParsedEvent, RawReport, parse_report};
