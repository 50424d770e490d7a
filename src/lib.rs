//! `inflation-trends` library crate.
//!
//! The binary (`ie`) is a thin wrapper around this library so that:
//!
//! - the cleaning and metrics pipeline is testable without spawning processes
//! - the report, plots, and dashboard share one immutable pipeline result
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod tui;
