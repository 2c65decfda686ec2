//! Terminal rendering for prioritize types.
//!
//! Extension traits that add colored output to prioritize-core types using
//! owo_colors.

use owo_colors::OwoColorize;
use prioritize_core::{Color, DisplayEvent, FeedReport, Fallback, ParsedEvent};

pub trait Render {
    fn render(&self) -> String;
}

fn colorize(color: Color, text: &str) -> String {
    match color {
        Color::Red => text.red().to_string(),
        Color::Blue => text.blue().to_string(),
        Color::Green => text.green().to_string(),
    }
}

impl Render for DisplayEvent {
    fn render(&self) -> String {
        let event = self.event();
        let when = if self.start() == self.end() {
            self.start().to_string()
        } else {
            format!("{} → {}", self.start(), self.end())
        };

        format!(
            "{} {} {}",
            colorize(self.color(), "●"),
            colorize(self.color(), event.title()),
            when.dimmed()
        )
    }
}

impl Render for Fallback {
    fn render(&self) -> String {
        let text = match self {
            Fallback::MissingDescription => "no description".to_string(),
            Fallback::MissingDueDate => "no due date, used processing date".to_string(),
            Fallback::UnparseableDueDate(raw) => {
                format!("unreadable due date \"{}\", used processing date", raw)
            }
        };
        text.yellow().to_string()
    }
}

impl Render for ParsedEvent {
    fn render(&self) -> String {
        let event = self.event();
        let mut lines = vec![format!(
            "   {} {}",
            event.title().bold(),
            event.start().to_iso_string().dimmed()
        )];

        if !event.description().is_empty() {
            lines.push(format!("      {}", event.description()));
        }
        for fallback in self.fallbacks() {
            lines.push(format!(
                "      {} {} {}",
                "!".yellow(),
                format!("line {}:", self.line()).dimmed(),
                fallback.render()
            ));
        }

        lines.join("\n")
    }
}

impl Render for FeedReport {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {} loaded, {} failed",
            "Course feeds:".dimmed(),
            self.succeeded,
            self.failed()
        )];
        for failure in &self.failures {
            lines.push(format!("   {} {}: {}", "✗".red(), failure.source, failure.reason.red()));
        }
        lines.join("\n")
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
