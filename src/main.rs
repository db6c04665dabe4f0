//! CLI entry point for the log root-cause analysis engine.
//!
//! Loads logs (and deployments) from files into an in-memory store, runs one
//! analysis and prints the result as pretty JSON.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use rootcause::ingest::{ingest_deployments_file, ingest_logs_file, parse_timestamp};
use rootcause::{
    Analyzer, LogFilter, LogId, MemoryStore, RankedMatch, Settings, summarize_matches,
};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Log root-cause analysis
#[derive(Parser)]
#[command(
    name = "rootcause",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find similar past logs, failure patterns and suspicious deployments",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank stored logs by similarity to an existing log
    #[command(
        after_help = "Examples:\n  rootcause search --logs logs.jsonl --like 12\n  rootcause search --logs logs.jsonl --like 12 --top-k 3 --service auth"
    )]
    Search {
        /// JSON Lines log file with embeddings
        #[arg(long)]
        logs: PathBuf,

        /// Id of the log whose embedding is the query (ids follow file order, from 1)
        #[arg(long)]
        like: u32,

        /// Number of matches (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Group logs into failure patterns with k-means
    #[command(after_help = "Examples:\n  rootcause cluster --logs logs.jsonl --clusters 4 --level ERROR")]
    Cluster {
        /// JSON Lines log file with embeddings
        #[arg(long)]
        logs: PathBuf,

        /// Number of clusters (overrides config)
        #[arg(short = 'n', long)]
        clusters: Option<usize>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Pair deployments of a service with the logs that followed them
    #[command(
        after_help = "Examples:\n  rootcause correlate --logs logs.jsonl --deployments deployments.json --service auth"
    )]
    Correlate {
        /// JSON Lines log file with embeddings
        #[arg(long)]
        logs: PathBuf,

        /// JSON array of deployments
        #[arg(long)]
        deployments: PathBuf,

        /// Service to correlate
        #[arg(short, long)]
        service: String,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Only logs with this level
    #[arg(long)]
    level: Option<String>,

    /// Only logs from this service
    #[arg(long)]
    service: Option<String>,

    /// Only logs at or after this time (RFC 3339 or naive ISO-8601)
    #[arg(long, value_parser = parse_time_arg)]
    since: Option<DateTime<Utc>>,

    /// Only logs at or before this time
    #[arg(long, value_parser = parse_time_arg)]
    until: Option<DateTime<Utc>>,
}

impl FilterArgs {
    fn to_filter(&self) -> LogFilter {
        LogFilter {
            level: self.level.clone(),
            service: self.service.clone(),
            since: self.since,
            until: self.until,
        }
    }
}

fn parse_time_arg(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).ok_or_else(|| format!("invalid timestamp '{value}'"))
}

#[derive(Serialize)]
struct SearchOutput {
    summary: String,
    matches: Vec<RankedMatch>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path).map_err(|e| {
            anyhow!("Configuration error loading from {}: {e}", path.display())
        })?,
        None => Settings::load().map_err(|e| anyhow!("Configuration error: {e}"))?,
    };

    init_tracing(&settings);

    match cli.command {
        Commands::Config => {
            print!("{}", settings.to_toml()?);
        }

        Commands::Search {
            logs,
            like,
            top_k,
            filter,
        } => {
            let store = load_store(&settings, &logs, None)?;
            let id = LogId::new(like).ok_or_else(|| anyhow!("log ids start at 1"))?;
            let query = store
                .get_log(id)
                .ok_or_else(|| anyhow!("no log with id {id} in {}", logs.display()))?
                .embedding;
            let top_k = NonZeroUsize::new(top_k.unwrap_or(settings.search.default_top_k))
                .ok_or_else(|| anyhow!("--top-k must be at least 1"))?;

            let analyzer = Analyzer::with_settings(Arc::new(store), &settings);
            let matches = analyzer.search(&query, &filter.to_filter(), top_k)?;
            print_json(&SearchOutput {
                summary: summarize_matches(&matches),
                matches,
            })?;
        }

        Commands::Cluster {
            logs,
            clusters,
            filter,
        } => {
            let store = load_store(&settings, &logs, None)?;
            let analyzer = Analyzer::with_settings(Arc::new(store), &settings);
            let k = clusters.unwrap_or(settings.clustering.default_clusters);
            print_json(&analyzer.cluster(k, &filter.to_filter())?)?;
        }

        Commands::Correlate {
            logs,
            deployments,
            service,
        } => {
            let store = load_store(&settings, &logs, Some(deployments.as_path()))?;
            let analyzer = Analyzer::with_settings(Arc::new(store), &settings);
            print_json(&analyzer.correlate(&service)?)?;
        }
    }

    Ok(())
}

fn init_tracing(settings: &Settings) {
    let level = settings
        .logging
        .level
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_store(settings: &Settings, logs: &Path, deployments: Option<&Path>) -> Result<MemoryStore> {
    let store = MemoryStore::new(settings.embedding.dimension);
    ingest_logs_file(&store, logs, None)
        .with_context(|| format!("Failed to ingest logs from {}", logs.display()))?;
    if let Some(path) = deployments {
        ingest_deployments_file(&store, path)
            .with_context(|| format!("Failed to ingest deployments from {}", path.display()))?;
    }
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
