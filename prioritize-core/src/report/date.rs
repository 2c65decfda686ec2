//! Due-date parsing for schedule reports.

use chrono::NaiveDate;

use crate::context::ProcessingContext;

/// Parse the value of a `Due Date:` line.
///
/// Formats come from the context, `Month DD, YYYY` first. Bold markers, a
/// trailing period and ordinal suffixes (`5th`) are ignored. Returns `None`
/// when no format matches; the caller decides the fallback.
pub fn parse_due_date(text: &str, ctx: &ProcessingContext) -> Option<NaiveDate> {
    let cleaned = text
        .trim()
        .trim_matches('*')
        .trim()
        .trim_end_matches('.')
        .trim();

    if cleaned.is_empty() {
        return None;
    }

    let cleaned = strip_ordinal_suffixes(cleaned);

    ctx.date_formats()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

/// "March 5th, 2025" -> "March 5, 2025"
fn strip_ordinal_suffixes(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let digits = word.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return word.to_string();
            }

            let (number, rest) = word.split_at(digits);
            ["st", "nd", "rd", "th"]
                .iter()
                .find_map(|suffix| rest.strip_prefix(suffix))
                .map(|tail| format!("{number}{tail}"))
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ProcessingContext {
        ProcessingContext::new(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn primary_format() {
        assert_eq!(parse_due_date("March 5, 2025", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("December 25, 2025", &ctx()), date(2025, 12, 25));
    }

    #[test]
    fn tolerates_markup_and_ordinals() {
        assert_eq!(parse_due_date("**March 5, 2025**", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("March 5, 2025.", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("March 5th, 2025", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("April 22nd, 2025", &ctx()), date(2025, 4, 22));
    }

    #[test]
    fn widened_formats() {
        assert_eq!(parse_due_date("Mar 5, 2025", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("2025-03-05", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("03/05/2025", &ctx()), date(2025, 3, 5));
        assert_eq!(parse_due_date("Wednesday, March 5, 2025", &ctx()), date(2025, 3, 5));
    }

    #[test]
    fn widened_formats_can_be_disabled() {
        let strict = ctx().with_date_formats(Vec::new());
        assert_eq!(parse_due_date("2025-03-05", &strict), None);
        assert_eq!(parse_due_date("March 5, 2025", &strict), date(2025, 3, 5));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_due_date("not-a-date", &ctx()), None);
        assert_eq!(parse_due_date("", &ctx()), None);
        assert_eq!(parse_due_date("February 30, 2025", &ctx()), None);
    }
}
