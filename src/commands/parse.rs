use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use prioritize_core::{ProcessingContext, parse_report};

use crate::render::{Render, pluralize};
use crate::sources;

pub fn run(report: &Path, ctx: &ProcessingContext, json: bool) -> Result<()> {
    let parsed = parse_report(&sources::read_report(report)?, ctx);

    if json {
        let out = serde_json::to_string_pretty(&parsed).context("Failed to serialize events")?;
        println!("{}", out);
        return Ok(());
    }

    if parsed.is_empty() {
        println!("{}", "No events found in report".dimmed());
        return Ok(());
    }

    let mut current_week: Option<Option<&str>> = None;
    for event in &parsed {
        let week = event.event().week_label();
        if current_week != Some(week) {
            if current_week.is_some() {
                println!();
            }
            println!("{}", week.unwrap_or("(no week)").bold());
            current_week = Some(week);
        }
        println!("{}", event.render());
    }

    let degraded = parsed.iter().filter(|p| p.is_degraded()).count();
    println!();
    println!(
        "{} {}, {} with defaults",
        parsed.len(),
        pluralize("event", parsed.len()),
        degraded
    );

    Ok(())
}
