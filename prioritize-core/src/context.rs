//! Per-request processing context.

use chrono::NaiveDate;

use crate::config::PrioritizeConfig;

/// The primary due-date format of schedule reports: `March 5, 2025`.
pub const PRIMARY_DATE_FORMAT: &str = "%B %d, %Y";

/// Formats tried after the primary one.
pub const DEFAULT_EXTRA_DATE_FORMATS: &[&str] = &[
    "%b %d, %Y",
    "%B %d %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%A, %B %d, %Y",
];

/// Everything a core operation needs to know about the request it serves.
///
/// Core operations keep no state of their own; the processing date used as
/// the fallback for unresolvable dates and the accepted due-date formats
/// are passed in through this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingContext {
    processing_date: NaiveDate,
    date_formats: Vec<String>,
}

impl ProcessingContext {
    pub fn new(processing_date: NaiveDate) -> Self {
        ProcessingContext {
            processing_date,
            date_formats: DEFAULT_EXTRA_DATE_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }

    pub fn from_config(config: &PrioritizeConfig, processing_date: NaiveDate) -> Self {
        Self::new(processing_date).with_date_formats(config.date_formats.clone())
    }

    /// Replace the extra due-date formats. The primary format is always tried first.
    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }

    pub fn processing_date(&self) -> NaiveDate {
        self.processing_date
    }

    /// Due-date formats in the order they are tried.
    pub fn date_formats(&self) -> impl Iterator<Item = &str> {
        std::iter::once(PRIMARY_DATE_FORMAT).chain(self.date_formats.iter().map(String::as_str))
    }
}
