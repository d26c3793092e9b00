//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the logger
//! - loads the bundled snapshot into a refresh controller
//! - hands off to the TUI or prints a one-shot report

use clap::Parser;

use crate::cli::{Command, CommonArgs, PlotArgs, SummaryArgs, TuiArgs};
use crate::data::{ApiClient, load_bundled};
use crate::domain::{DashConfig, Metric, MetricTable};
use crate::error::AppError;
use crate::logging::LogTarget;
use crate::view::ViewBinding;

pub mod refresh;

pub use refresh::{DataSource, RefreshController, RefreshResult, RefreshState};

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // Pick up COVID_* overrides from `.env` before clap reads the environment.
    dotenvy::dotenv().ok();

    // We want `covid` and `covid -m totalDeaths` to behave like `covid tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => handle_summary(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let target = args
        .common
        .log_file
        .clone()
        .map(LogTarget::File)
        .unwrap_or_else(LogTarget::default_file);
    crate::logging::init(&target, args.common.verbose)?;

    let config = dash_config_from_args(&args.common, args.metric);
    log::info!("starting dashboard with {config:?}");
    let controller = start(&config)?;
    crate::tui::run(controller, &config)
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    init_cli_logging(&args.common)?;
    let config = dash_config_from_args(&args.common, Metric::TotalCases);
    let mut controller = start(&config)?;

    let (rows, window) = (args.rows, config.window);
    let mut report = String::new();
    {
        let render = |table: &MetricTable, _metric: Metric| {
            report = crate::report::format_summary(table, rows, window);
        };
        let mut view = ViewBinding::new(controller.table(), config.metric, render);
        if args.refresh {
            report_refresh(controller.refresh(&mut view));
        }
    }

    println!("{report}");
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    init_cli_logging(&args.common)?;
    let config = dash_config_from_args(&args.common, args.metric);
    let mut controller = start(&config)?;

    let (width, height, window) = (args.width, args.height, config.window);
    let mut plot = String::new();
    {
        let render = |table: &MetricTable, metric: Metric| {
            plot = crate::plot::render_ascii_bars(table, metric, window, width, height);
        };
        let mut view = ViewBinding::new(controller.table(), config.metric, render);
        if args.refresh {
            report_refresh(controller.refresh(&mut view));
        }
    }

    println!("{plot}");
    Ok(())
}

/// Load the bundled snapshot and build the controller around the live API.
///
/// Any problem here is fatal: there is no data to display.
pub fn start(config: &DashConfig) -> Result<RefreshController<ApiClient>, AppError> {
    let raw = load_bundled(&config.snapshot_path)?;
    let fetcher = ApiClient::new(config.api_url.clone());
    log::info!("live source: {}", fetcher.base_url());
    Ok(RefreshController::from_snapshot(fetcher, &raw)?)
}

pub fn dash_config_from_args(args: &CommonArgs, metric: Metric) -> DashConfig {
    DashConfig {
        snapshot_path: args.snapshot.clone(),
        api_url: args.api_url.clone(),
        window: args.window,
        metric,
    }
}

fn init_cli_logging(args: &CommonArgs) -> Result<(), AppError> {
    let target = args
        .log_file
        .clone()
        .map(LogTarget::File)
        .unwrap_or(LogTarget::Stderr);
    crate::logging::init(&target, args.verbose)
}

fn report_refresh(result: RefreshResult) {
    if let RefreshResult::Failed(err) = result {
        eprintln!("Live data unavailable ({err}); showing bundled snapshot.");
    }
}

/// Rewrite argv so `covid` defaults to `covid tui`.
///
/// Rules:
/// - `covid`                       -> `covid tui`
/// - `covid -m totalDeaths ...`    -> `covid tui -m totalDeaths ...`
/// - `covid --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
