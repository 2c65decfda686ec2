mod commands;
mod render;
mod sources;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use prioritize_core::{PrioritizeConfig, ProcessingContext, SortOrder};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "prioritize")]
#[command(about = "Turn schedule reports, course feeds and tasks into one calendar")]
struct Cli {
    /// Processing date used for unreadable due dates (YYYY-MM-DD, default today)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the events come from.
#[derive(Args, Debug)]
pub struct Inputs {
    /// Schedule report file ("-" for stdin)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Course calendar feed, URL or .ics file (repeatable)
    #[arg(short, long = "feed")]
    feeds: Vec<String>,

    /// Course listing JSON (file or URL) to discover feeds from
    #[arg(long)]
    courses: Option<String>,

    /// TOML file of ad-hoc tasks
    #[arg(short, long)]
    tasks: Option<PathBuf>,

    /// Event order (defaults to the config setting)
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Producer,
    Chronological,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Producer => SortOrder::Producer,
            SortArg::Chronological => SortOrder::Chronological,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the events read from a schedule report, grouped by week
    Parse {
        /// Report file ("-" for stdin)
        report: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show every event from all sources
    Agenda {
        #[command(flatten)]
        inputs: Inputs,

        /// Print calendar-widget JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the merged calendar as an .ics file
    Export {
        #[command(flatten)]
        inputs: Inputs,

        /// Output path (defaults to the config setting)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a data: URI instead of writing a file
        #[arg(long)]
        data_uri: bool,
    },
    /// Show config paths, or write a default config file
    Config {
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if let Commands::Config { init } = cli.command {
        return commands::config::run(init);
    }

    let config = PrioritizeConfig::load().map_err(|e| anyhow::anyhow!(e))?;
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let ctx = ProcessingContext::from_config(&config, date);

    match cli.command {
        Commands::Parse { report, json } => commands::parse::run(&report, &ctx, json),
        Commands::Agenda { inputs, json } => {
            commands::agenda::run(&inputs, &config, &ctx, json).await
        }
        Commands::Export {
            inputs,
            output,
            data_uri,
        } => commands::export::run(&inputs, &config, &ctx, output, data_uri).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Logs go to stderr so JSON and data-URI output stay clean on stdout.
fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    Ok(())
}
