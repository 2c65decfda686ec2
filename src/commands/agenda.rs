use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use prioritize_core::{PrioritizeConfig, ProcessingContext};

use super::{Collected, sort_order};
use crate::Inputs;
use crate::render::Render;

pub async fn run(
    inputs: &Inputs,
    config: &PrioritizeConfig,
    ctx: &ProcessingContext,
    json: bool,
) -> Result<()> {
    let collected = Collected::load(inputs, config, ctx).await?;
    let aggregation = collected.aggregate(sort_order(inputs, config));

    if json {
        let out = serde_json::to_string_pretty(aggregation.display_events())
            .context("Failed to serialize events")?;
        println!("{}", out);
        return Ok(());
    }

    if collected.feeds.succeeded + collected.feeds.failed() > 0 {
        println!("{}", collected.feeds.render());
        println!();
    }

    if aggregation.is_empty() {
        println!("{}", "No events".dimmed());
        return Ok(());
    }

    for event in aggregation.display_events() {
        println!("{}", event.render());
    }

    Ok(())
}
