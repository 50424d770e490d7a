//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the clean + derive pipeline
//! - prints reports/plots
//! - writes exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DataArgs, ExportArgs, LogLevel, PlotArgs, ReportArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ie` binary.
pub fn run() -> Result<(), AppError> {
    // A `.env` file may provide `T10YIE_CSV`.
    dotenvy::dotenv().ok();

    // We want `ie` and `ie -f data.csv` to behave like `ie tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log lines would corrupt the alternate screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging(cli.log_level);
    }

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(config_from_data_args(&args)),
    }
}

fn init_logging(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level.to_tracing())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = config_from_report_args(&args);
    let result = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&result));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&result, config.plot_kind, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_annual {
        crate::io::export::write_annual_csv(path, &result.metrics.annual)?;
        println!("Yearly averages written to {}", path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::summary::write_summary_json(path, &result)?;
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = RunConfig {
        export_annual: Some(args.output.clone()),
        ..config_from_data_args(&args.data)
    };
    let result = pipeline::run_pipeline(&config)?;
    crate::io::export::write_annual_csv(&args.output, &result.metrics.annual)?;
    info!(years = result.metrics.annual.len(), "export complete");
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = config_from_data_args(&args.data);
    let result = pipeline::run_pipeline(&config)?;

    let plot = crate::plot::render_ascii_plot(&result, args.kind, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn config_from_data_args(args: &DataArgs) -> RunConfig {
    RunConfig {
        csv_path: args.file.clone(),
        date_order: args.date_order,
        window: args.window.max(1),
        bins: args.bins.max(1),
        ..RunConfig::default()
    }
}

pub fn config_from_report_args(args: &ReportArgs) -> RunConfig {
    RunConfig {
        plot: !args.no_plot,
        plot_kind: args.kind,
        plot_width: args.width,
        plot_height: args.height,
        export_annual: (!args.no_export).then(|| args.export.clone()),
        export_json: args.export_json.clone(),
        ..config_from_data_args(&args.data)
    }
}

/// Rewrite argv so `ie` defaults to `ie tui`.
///
/// Rules:
/// - `ie`                      -> `ie tui`
/// - `ie -f data.csv ...`      -> `ie tui -f data.csv ...`
/// - `ie --help/--version/-h`  -> unchanged (show top-level help/version)
/// - any argv naming a subcommand is left as-is
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

    let names_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "report" | "export" | "plot" | "tui"));
    if names_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
