//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read source -> clean -> derive metrics
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Both receive the finished `PipelineResult` by reference and never mutate it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{Observation, RunConfig};
use crate::error::AppError;
use crate::io::cache::{CacheStatus, CleanCache};
use crate::io::ingest::{CleaningReport, IngestedData, load_observations};
use crate::metrics::{DerivedMetrics, derive_metrics};

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub source: PathBuf,
    pub observations: Vec<Observation>,
    pub cleaning: CleaningReport,
    pub metrics: DerivedMetrics,
}

impl PipelineResult {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<PipelineResult, AppError> {
    let ingest = load_observations(&config.csv_path, config.date_order)?;
    Ok(build_result(&config.csv_path, ingest, config))
}

/// Execute the pipeline, reusing cleaned data when the source is unchanged.
///
/// This is useful for the TUI where a reload should not redo work for an
/// untouched file.
pub fn run_pipeline_cached(
    config: &RunConfig,
    cache: &mut CleanCache,
) -> Result<(PipelineResult, CacheStatus), AppError> {
    let (ingest, status) = cache.load(&config.csv_path, config.date_order)?;
    Ok((build_result(&config.csv_path, ingest.clone(), config), status))
}

/// Derive metrics for already-cleaned data.
pub fn build_result(source: &Path, ingest: IngestedData, config: &RunConfig) -> PipelineResult {
    let metrics = derive_metrics(&ingest.observations, config.window, config.bins);
    PipelineResult {
        source: source.to_path_buf(),
        observations: ingest.observations,
        cleaning: ingest.report,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::error::{DataShortfall, EXIT_INPUT};
    use crate::io::export::write_annual_csv;

    /// A per-test scratch path under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ie-pipeline-{}-{name}", std::process::id()))
    }

    fn config_for(csv: &str, name: &str) -> RunConfig {
        let path = scratch(name);
        std::fs::write(&path, csv).unwrap();
        RunConfig {
            csv_path: path,
            ..RunConfig::default()
        }
    }

    fn daily_csv(days: i64, rate: impl Fn(i64) -> f64) -> String {
        let start = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        let mut csv = String::from("DATE,T10YIE\n");
        for i in 0..days {
            csv.push_str(&format!("{},{}\n", start + Duration::days(i), rate(i)));
        }
        csv
    }

    #[test]
    fn duplicates_and_missing_rates_are_cleaned() {
        let config = config_for(
            "DATE,T10YIE\n2021-01-01,1.5\n2021-01-01,1.5\n2021-01-02,NaN\n2021-01-03,1.7\n",
            "clean.csv",
        );
        let result = run_pipeline(&config).unwrap();
        let got: Vec<(String, f64)> = result
            .observations
            .iter()
            .map(|o| (o.date.to_string(), o.rate))
            .collect();
        assert_eq!(got, vec![("2021-01-01".to_string(), 1.5), ("2021-01-03".to_string(), 1.7)]);
        assert_eq!(result.cleaning.duplicates_removed, 1);
        assert_eq!(result.cleaning.invalid_rates, 1);
    }

    #[test]
    fn header_only_file_yields_empty_tables() {
        let config = config_for("DATE,T10YIE\n", "empty.csv");
        let result = run_pipeline(&config).unwrap();
        assert!(result.is_empty());
        assert!(result.metrics.rolling.is_empty());
        assert!(result.metrics.annual.is_empty());
        assert!(result.metrics.monthly.is_empty());
        assert_eq!(result.metrics.extremes, Err(DataShortfall::NoData));
    }

    #[test]
    fn missing_source_is_an_input_error() {
        let config = RunConfig {
            csv_path: scratch("does-not-exist.csv"),
            ..RunConfig::default()
        };
        let err = run_pipeline(&config).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.to_string().contains("not found or unreadable"));
    }

    #[test]
    fn dates_are_sorted_unique_and_annual_counts_add_up() {
        let csv = "DATE,T10YIE\n2022-03-01,2.9\n2021-12-31,2.5\n2022-03-01,3.0\n2021-06-15,2.4\n";
        let result = run_pipeline(&config_for(csv, "order.csv")).unwrap();
        for pair in result.observations.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        let total: usize = result.metrics.annual.iter().map(|a| a.count).sum();
        assert_eq!(total, result.observations.len());
        assert_eq!(result.cleaning.conflicting_dates, 1);
    }

    #[test]
    fn rolling_window_grows_then_caps() {
        let result = run_pipeline(&config_for(&daily_csv(120, |i| 2.0 + (i % 7) as f64 * 0.01), "rolling.csv")).unwrap();
        let rolling = &result.metrics.rolling;
        assert_eq!(rolling.len(), 120);
        assert_eq!(rolling[0].window_len, 1);
        assert_eq!(rolling[0].std_dev, 0.0);
        assert_eq!(rolling[89].window_len, 90);
        assert_eq!(rolling[119].window_len, 90);
    }

    #[test]
    fn linear_series_recovers_its_trend() {
        let result = run_pipeline(&config_for(&daily_csv(60, |i| 1.0 + 0.01 * i as f64), "trend.csv")).unwrap();
        let fit = result.metrics.trend.as_ref().unwrap();
        assert!((fit.slope - 0.01).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!(fit.r_squared > 0.999_999);
    }

    #[test]
    fn rerun_export_is_byte_identical() {
        let config = config_for(&daily_csv(400, |i| 2.0 + (i % 11) as f64 * 0.05), "export-src.csv");
        let out = scratch("export.csv");

        write_annual_csv(&out, &run_pipeline(&config).unwrap().metrics.annual).unwrap();
        let first = std::fs::read(&out).unwrap();
        write_annual_csv(&out, &run_pipeline(&config).unwrap().metrics.annual).unwrap();
        let second = std::fs::read(&out).unwrap();

        assert_eq!(first, second);
        assert!(String::from_utf8(first).unwrap().starts_with("Year,Rate\n2020,"));
    }

    #[test]
    fn cached_rerun_matches_fresh_run() {
        let config = config_for(&daily_csv(30, |i| 2.0 + i as f64 * 0.001), "cached.csv");
        let mut cache = CleanCache::new();
        let (first, s1) = run_pipeline_cached(&config, &mut cache).unwrap();
        let (second, s2) = run_pipeline_cached(&config, &mut cache).unwrap();
        assert_eq!(s1, CacheStatus::Miss);
        assert_eq!(s2, CacheStatus::Hit);
        assert_eq!(first, second);
        assert_eq!(first, run_pipeline(&config).unwrap());
    }
}
