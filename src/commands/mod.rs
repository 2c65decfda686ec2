pub mod agenda;
pub mod config;
pub mod export;
pub mod parse;

use anyhow::Result;
use prioritize_core::{
    Aggregation, Event, EventAggregator, FeedReport, ParsedEvent, PrioritizeConfig,
    ProcessingContext, SortOrder, parse_report,
};

use crate::Inputs;
use crate::sources;

/// Everything loaded for one agenda or export run.
pub struct Collected {
    pub parsed: Vec<ParsedEvent>,
    pub feeds: FeedReport,
    pub tasks: Vec<Event>,
}

impl Collected {
    /// Read the report, tasks and course feeds named on the command line.
    ///
    /// Feeds from the config file are always included. A feed or course
    /// listing that cannot be read is reported and skipped.
    pub async fn load(
        inputs: &Inputs,
        config: &PrioritizeConfig,
        ctx: &ProcessingContext,
    ) -> Result<Self> {
        let parsed = match &inputs.report {
            Some(path) => parse_report(&sources::read_report(path)?, ctx),
            None => Vec::new(),
        };

        let tasks = match &inputs.tasks {
            Some(path) => sources::read_tasks(path)?
                .into_iter()
                .map(Event::ad_hoc)
                .collect(),
            None => Vec::new(),
        };

        let client = sources::http_client()?;
        let mut locations: Vec<String> = config.feeds.iter().chain(&inputs.feeds).cloned().collect();

        let mut listing_failure = None;
        if let Some(courses) = &inputs.courses {
            match sources::discover_feeds(&client, courses).await {
                Ok(urls) => locations.extend(urls),
                Err(e) => listing_failure = Some((courses.clone(), format!("{:#}", e))),
            }
        }

        let mut feeds = if locations.is_empty() {
            FeedReport::default()
        } else {
            sources::load_feeds(&client, locations, ctx).await
        };
        // An unreadable course listing is one more failed source
        if let Some((source, reason)) = listing_failure {
            feeds.record_failure(source, reason);
        }

        Ok(Collected {
            parsed,
            feeds,
            tasks,
        })
    }

    pub fn aggregate(&self, order: SortOrder) -> Aggregation {
        let external: Vec<Event> = self
            .feeds
            .events
            .iter()
            .cloned()
            .map(Event::from_course)
            .collect();

        EventAggregator::new(order).aggregate(&self.parsed, &external, &self.tasks)
    }
}

/// The command-line order wins over the configured one.
pub fn sort_order(inputs: &Inputs, config: &PrioritizeConfig) -> SortOrder {
    inputs.sort.map(SortOrder::from).unwrap_or(config.sort)
}
