//! Downloadable calendar export.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::ics::CalendarDocument;

/// A serialized calendar, ready to be saved or offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarExport {
    bytes: Vec<u8>,
}

impl CalendarExport {
    pub const FILENAME: &'static str = "schedule.ics";
    pub const MEDIA_TYPE: &'static str = "text/calendar";

    pub fn new(bytes: Vec<u8>) -> Self {
        CalendarExport { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:text/calendar;base64,...` for inline download links.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MEDIA_TYPE, STANDARD.encode(&self.bytes))
    }
}

impl From<&CalendarDocument> for CalendarExport {
    fn from(doc: &CalendarDocument) -> Self {
        CalendarExport::new(doc.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AdHocTask, Event};
    use chrono::NaiveDate;

    #[test]
    fn data_uri_round_trips_bytes() {
        let export = CalendarExport::new(b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_vec());
        let uri = export.data_uri();

        let encoded = uri.strip_prefix("data:text/calendar;base64,").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), export.bytes());
    }

    #[test]
    fn export_from_document() {
        let task = Event::ad_hoc(AdHocTask {
            title: "Pay rent".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        });
        let doc = CalendarDocument::build([&task]).unwrap();

        let export = CalendarExport::from(&doc);

        assert_eq!(CalendarExport::FILENAME, "schedule.ics");
        assert!(String::from_utf8_lossy(export.bytes()).contains("SUMMARY:Pay rent"));
    }
}
