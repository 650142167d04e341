//! `tendly` - prints dashboard data for a filter selection as JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tendly_core::{BucketingMode, Config, TenderFilters, TenderRecord};
use tendly_features::DashboardEngine;
use tendly_ingestion::{cached_source, SqliteTenderSource, TenderSource};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "tendly", version, about = "Estonian public procurement dashboard data")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and TENDLY_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// All dashboard panels for a selection
    Snapshot(Selection),
    /// Only the cost distribution for a selection
    Distribution(Selection),
    /// Values available for the sector and procedure filters
    Filters,
}

#[derive(Debug, Args)]
struct Selection {
    /// Minimum estimated cost (EUR)
    #[arg(long)]
    min_cost: Option<f64>,
    /// Maximum estimated cost (EUR)
    #[arg(long)]
    max_cost: Option<f64>,
    /// Procurement sector code
    #[arg(long)]
    sector: Option<String>,
    /// Procedure type code
    #[arg(long)]
    procedure: Option<String>,
    /// Earliest publication date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Latest publication date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Number of cost buckets
    #[arg(long)]
    buckets: Option<usize>,
    /// Bucketing mode: linear or logarithmic
    #[arg(long)]
    mode: Option<BucketingMode>,
}

impl Selection {
    fn filters(&self) -> TenderFilters {
        TenderFilters {
            cost_min: self.min_cost,
            cost_max: self.max_cost,
            sector_code: self.sector.clone(),
            procedure_type_code: self.procedure.clone(),
            published_from: self.from,
            published_to: self.to,
        }
    }

    fn apply(&self, config: &mut Config) {
        if let Some(buckets) = self.buckets {
            config.distribution.bucket_count = buckets;
        }
        if let Some(mode) = self.mode {
            config.distribution.mode = mode;
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tendly=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn open_source(config: &Config) -> Result<Box<dyn TenderSource>> {
    let source = SqliteTenderSource::from_config(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.path))?;
    Ok(cached_source(source, &config.cache)?)
}

fn run_selection(
    config: &Config,
    selection: &Selection,
) -> Result<(DashboardEngine, Vec<TenderRecord>)> {
    let engine = DashboardEngine::new(config)?;
    let source = open_source(config)?;
    let records = source
        .fetch_filtered_records(&selection.filters())
        .context("failed to query tenders")?;
    info!(records = records.len(), "loaded tender records");
    Ok((engine, records))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match &cli.command {
        Command::Snapshot(selection) => {
            selection.apply(&mut config);
            config.validate()?;
            let (engine, records) = run_selection(&config, selection)?;
            let snapshot = engine.snapshot(&records);
            if snapshot.is_empty() {
                warn!("no data available for the selected filters");
            }
            print_json(&snapshot, cli.pretty)?;
        }
        Command::Distribution(selection) => {
            selection.apply(&mut config);
            config.validate()?;
            let (engine, records) = run_selection(&config, selection)?;
            let buckets = engine.distribution().compute(&records);
            if buckets.len() <= 1 {
                warn!(buckets = buckets.len(), "insufficient data for a cost distribution");
            }
            print_json(&buckets, cli.pretty)?;
        }
        Command::Filters => {
            config.validate()?;
            let source = open_source(&config)?;
            print_json(&source.filter_options()?, cli.pretty)?;
        }
    }

    Ok(())
}
