//! Reporting utilities: formatted terminal output for `ie report`.

pub mod format;

pub use format::*;
