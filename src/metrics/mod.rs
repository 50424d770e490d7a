//! Metrics derived from the cleaned observation series.
//!
//! Every function takes the cleaned, date-ascending observations and returns
//! fresh values. Table-shaped outputs are empty for an empty series; scalar
//! outputs report a `DataShortfall` instead.

pub mod aggregate;
pub mod describe;
pub mod extremes;
pub mod rolling;
pub mod trend;

pub use aggregate::*;
pub use describe::*;
pub use extremes::*;
pub use rolling::*;
pub use trend::*;

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    AnnualAverage, Extremes, HistogramBin, MonthlyAverage, Observation, RollingStat, SummaryStats, TrendFit,
    YearDistribution,
};
use crate::error::DataShortfall;

/// Everything derived from one cleaned series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub window: usize,
    pub rolling: Vec<RollingStat>,
    pub annual: Vec<AnnualAverage>,
    pub monthly: Vec<MonthlyAverage>,
    pub distributions: Vec<YearDistribution>,
    pub histogram: Vec<HistogramBin>,
    pub trend: Result<TrendFit, DataShortfall>,
    pub extremes: Result<Extremes, DataShortfall>,
    pub summary: Result<SummaryStats, DataShortfall>,
}

/// Compute every metric for `observations`.
pub fn derive_metrics(observations: &[Observation], window: usize, bins: usize) -> DerivedMetrics {
    let metrics = DerivedMetrics {
        window,
        rolling: rolling_stats(observations, window),
        annual: annual_averages(observations),
        monthly: monthly_averages(observations),
        distributions: year_distributions(observations),
        histogram: histogram(observations, bins),
        trend: trend_fit(observations),
        extremes: extremes(observations),
        summary: summary_stats(observations),
    };

    debug!(
        observations = observations.len(),
        years = metrics.annual.len(),
        months = metrics.monthly.len(),
        trend = metrics.trend.is_ok(),
        "derived metrics"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_reports_no_data_everywhere() {
        let m = derive_metrics(&[], 90, 30);
        assert!(m.rolling.is_empty());
        assert!(m.annual.is_empty());
        assert!(m.monthly.is_empty());
        assert!(m.distributions.is_empty());
        assert!(m.histogram.is_empty());
        assert_eq!(m.trend, Err(DataShortfall::NoData));
        assert_eq!(m.extremes, Err(DataShortfall::NoData));
        assert_eq!(m.summary, Err(DataShortfall::NoData));
    }
}
