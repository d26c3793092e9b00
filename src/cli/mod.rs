//! Command-line parsing for the dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::api::DEFAULT_BASE_URL;
use crate::data::snapshot::DEFAULT_SNAPSHOT_PATH;
use crate::domain::Metric;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "Cumulative pandemic metrics dashboard (England)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
    /// Print the most recent rows as a text table.
    Summary(SummaryArgs),
    /// Print an ASCII bar chart of one metric.
    Plot(PlotArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Bundled snapshot JSON used as the baseline dataset.
    #[arg(long, env = "COVID_SNAPSHOT", default_value = DEFAULT_SNAPSHOT_PATH)]
    pub snapshot: PathBuf,

    /// Base URL of the statistics API.
    #[arg(long, env = "COVID_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Only show the most recent N days (0 = full span).
    #[arg(short = 'w', long, default_value_t = 0)]
    pub window: usize,

    /// Log file (defaults to `covid-dash.log` in the temp dir for the TUI, stderr otherwise).
    #[arg(long, env = "COVID_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Initially selected metric.
    #[arg(short, long, value_enum, default_value_t = Metric::TotalCases)]
    pub metric: Metric,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of rows to print.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub rows: usize,

    /// Try a live fetch before printing (falls back to the bundled data).
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Metric to plot.
    #[arg(short, long, value_enum, default_value_t = Metric::TotalCases)]
    pub metric: Metric,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Try a live fetch before plotting (falls back to the bundled data).
    #[arg(long)]
    pub refresh: bool,
}
