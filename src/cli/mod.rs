//! Command-line parsing for the T10YIE trend viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline/metrics code.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{DEFAULT_BINS, DEFAULT_EXPORT_PATH, DEFAULT_WINDOW, DateOrder, PlotKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ie", version, about = "10-year breakeven inflation (T10YIE) trend viewer")]
pub struct Cli {
    /// Log verbosity (written to stderr; ignored by the TUI).
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean the CSV, print statistics and tables, plot, and export yearly averages.
    Report(ReportArgs),
    /// Only write the yearly-average CSV (useful for scripting).
    Export(ExportArgs),
    /// Print a single ASCII plot.
    Plot(PlotArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same underlying pipeline as `ie report`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(DataArgs),
}

/// Where the data comes from and how it is read.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// CSV file with a date column and a rate column.
    #[arg(short = 'f', long = "file", env = "T10YIE_CSV", default_value = "T10YIE.csv")]
    pub file: PathBuf,

    /// How to read ambiguous numeric dates such as 03/04/2021.
    #[arg(long, value_enum, default_value_t = DateOrder::DayFirst)]
    pub date_order: DateOrder,

    /// Rolling window length (observations).
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Histogram bins.
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,
}

/// Options for `ie report`.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Which plot to render under the report.
    #[arg(long, value_enum, default_value_t = PlotKind::Rolling)]
    pub kind: PlotKind,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Yearly-average CSV path (overwritten on every run).
    #[arg(long, default_value = DEFAULT_EXPORT_PATH)]
    pub export: PathBuf,

    /// Do not write the yearly-average CSV.
    #[arg(long)]
    pub no_export: bool,

    /// Also dump the whole run (observations + metrics) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `ie export`.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output path.
    #[arg(short = 'o', long, default_value = DEFAULT_EXPORT_PATH)]
    pub output: PathBuf,
}

/// Options for `ie plot`.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, value_enum, default_value_t = PlotKind::Rate)]
    pub kind: PlotKind,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
