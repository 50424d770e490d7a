//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the metrics and presentation code
//! - exported to JSON/CSV
//! - handed to the dashboard as read-only inputs

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default trailing window (in observations) for rolling statistics.
pub const DEFAULT_WINDOW: usize = 90;

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 30;

/// Default path of the annual-average export.
pub const DEFAULT_EXPORT_PATH: &str = "Yearly_Average_Inflation_Expectation.csv";

/// One cleaned `(date, rate)` data point. `rate` is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Inflation expectation, in percent.
    pub rate: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        Self { date, rate }
    }

    /// Fractional calendar year (e.g. mid-2021 ≈ 2021.5), used as a chart x-axis.
    pub fn year_fraction(&self) -> f64 {
        year_fraction(self.date)
    }
}

pub fn year_fraction(date: NaiveDate) -> f64 {
    let days_in_year = if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    date.year() as f64 + date.ordinal0() as f64 / days_in_year
}

/// Trailing-window statistics aligned one-to-one with the observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStat {
    pub date: NaiveDate,
    pub mean: f64,
    /// Sample standard deviation; 0.0 when the window holds a single point.
    pub std_dev: f64,
    /// Number of observations in the window (`min(i + 1, window)`).
    pub window_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualAverage {
    pub year: i32,
    pub mean_rate: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    pub mean_rate: f64,
    pub count: usize,
}

/// Ordinary least squares fit of `rate ≈ slope * day_offset + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    /// Percentage points per day.
    pub slope: f64,
    /// Percent, at `origin`.
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
    /// Earliest observation date (day offset 0).
    pub origin: NaiveDate,
}

impl TrendFit {
    pub fn predict(&self, day_offset: f64) -> f64 {
        self.slope * day_offset + self.intercept
    }

    pub fn predict_date(&self, date: NaiveDate) -> f64 {
        self.predict((date - self.origin).num_days() as f64)
    }
}

/// Highest and lowest observations of the cleaned series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub highest: Observation,
    pub lowest: Observation,
}

/// Descriptive summary of the rate column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Box-plot data for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearDistribution {
    pub year: i32,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Equal-width histogram bin over `[lower, upper)` (the last bin is closed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// A dated annotation drawn on the events chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketEvent {
    pub date: NaiveDate,
    pub label: &'static str,
}

/// How ambiguous numeric dates (`03/04/2021`) are read.
///
/// ISO dates are always accepted regardless of this setting; when the preferred
/// order cannot produce a valid date, the other order is tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

/// Line plots available from `ie plot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    /// Daily rate over time.
    Rate,
    /// Daily rate with the rolling mean overlaid.
    Rolling,
    /// Rolling standard deviation.
    Volatility,
    /// Daily rate with the OLS trend line overlaid.
    Trend,
}

/// Fully-resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    pub date_order: DateOrder,
    pub window: usize,
    pub bins: usize,
    pub plot: bool,
    pub plot_kind: PlotKind,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_annual: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("T10YIE.csv"),
            date_order: DateOrder::DayFirst,
            window: DEFAULT_WINDOW,
            bins: DEFAULT_BINS,
            plot: true,
            plot_kind: PlotKind::Rolling,
            plot_width: 100,
            plot_height: 25,
            export_annual: Some(PathBuf::from(DEFAULT_EXPORT_PATH)),
            export_json: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_fraction_handles_leap_years() {
        let d = NaiveDate::from_ymd_opt(2020, 7, 2).unwrap();
        // ordinal0 = 183 in a 366-day year.
        assert!((year_fraction(d) - (2020.0 + 183.0 / 366.0)).abs() < 1e-12);
        let jan1 = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(year_fraction(jan1), 2021.0);
    }

    #[test]
    fn trend_predicts_from_origin() {
        let origin = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let fit = TrendFit {
            slope: 0.5,
            intercept: 2.0,
            r_squared: 1.0,
            n: 2,
            origin,
        };
        let later = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap();
        assert!((fit.predict_date(later) - 4.0).abs() < 1e-12);
    }
}
