//! Reading reports, tasks and course feeds from disk or the network.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use prioritize_core::feed::extract_calendar_urls;
use prioritize_core::{AdHocTask, FeedReport, ProcessingContext, RawReport};
use serde::Deserialize;

/// Feed downloads give up after this long.
const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Bearer token for course listings served by the learning platform API.
const API_TOKEN_VAR: &str = "CANVAS_API_TOKEN";

/// Read a report from a file, or from stdin when the path is `-`.
pub fn read_report(path: &Path) -> Result<RawReport> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read report from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?
    };

    Ok(RawReport::new(text))
}

#[derive(Deserialize)]
struct TaskFile {
    #[serde(default)]
    tasks: Vec<AdHocTask>,
}

/// Ad-hoc tasks from a TOML file of `[[tasks]]` tables.
pub fn read_tasks(path: &Path) -> Result<Vec<AdHocTask>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tasks {}", path.display()))?;
    parse_tasks(&content).with_context(|| format!("Invalid tasks file {}", path.display()))
}

fn parse_tasks(content: &str) -> Result<Vec<AdHocTask>> {
    let file: TaskFile = toml::from_str(content)?;
    Ok(file.tasks)
}

fn is_url(location: &str) -> bool {
    location.starts_with("https://") || location.starts_with("http://")
}

pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(FEED_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Text behind a URL or in a local file.
async fn fetch_text(client: &reqwest::Client, location: &str) -> Result<String> {
    if !is_url(location) {
        return tokio::fs::read_to_string(location)
            .await
            .with_context(|| format!("Failed to read {}", location));
    }

    let mut request = client.get(location);
    if let Ok(token) = std::env::var(API_TOKEN_VAR) {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", location))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Failed to fetch {} (status {})", location, status);
    }

    response.text().await.context("Failed to read response body")
}

/// Feed URLs listed in a course listing.
pub async fn discover_feeds(client: &reqwest::Client, courses: &str) -> Result<Vec<String>> {
    let listing = fetch_text(client, courses).await?;
    let urls = extract_calendar_urls(&listing).map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(count = urls.len(), "discovered course feeds");
    Ok(urls)
}

/// Fetch every feed concurrently and fold the results in the given order.
pub async fn load_feeds(
    client: &reqwest::Client,
    locations: Vec<String>,
    ctx: &ProcessingContext,
) -> FeedReport {
    let handles: Vec<_> = locations
        .into_iter()
        .map(|location| {
            let client = client.clone();
            let task = tokio::spawn({
                let location = location.clone();
                async move { fetch_text(&client, &location).await }
            });
            (location, task)
        })
        .collect();

    let mut fetched = Vec::with_capacity(handles.len());
    for (location, task) in handles {
        let result = match task.await {
            Ok(result) => result.map_err(|e| format!("{:#}", e)),
            Err(e) => Err(format!("fetch task failed: {}", e)),
        };
        fetched.push((location, result));
    }

    FeedReport::collect(fetched, ctx)
}
