use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use prioritize_core::{CalendarDocument, CalendarExport, PrioritizeConfig, ProcessingContext};

use super::{Collected, sort_order};
use crate::Inputs;
use crate::render::{Render, pluralize};

pub async fn run(
    inputs: &Inputs,
    config: &PrioritizeConfig,
    ctx: &ProcessingContext,
    output: Option<PathBuf>,
    data_uri: bool,
) -> Result<()> {
    let collected = Collected::load(inputs, config, ctx).await?;
    let aggregation = collected.aggregate(sort_order(inputs, config));

    let doc = CalendarDocument::build_named(Some(config.calendar_name.as_str()), aggregation.events())
        .map_err(|e| anyhow::anyhow!(e))?;
    let export = CalendarExport::from(&doc);

    if data_uri {
        println!("{}", export.data_uri());
        return Ok(());
    }

    let path = output.unwrap_or_else(|| config.output.clone());
    std::fs::write(&path, export.bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if collected.feeds.failed() > 0 {
        eprintln!("{}", collected.feeds.render());
    }
    println!(
        "{} Wrote {} {} to {}",
        "✓".green(),
        doc.len(),
        pluralize("event", doc.len()),
        path.display()
    );

    Ok(())
}
