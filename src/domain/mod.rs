//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned observations (`Observation`)
//! - derived tables (`RollingStat`, `AnnualAverage`, `MonthlyAverage`, ...)
//! - run configuration (`RunConfig`, `DateOrder`, `PlotKind`)
//! - the fixed event annotations (`market_events`)

pub mod events;
pub mod types;

pub use events::*;
pub use types::*;
