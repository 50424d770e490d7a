//! Distribution summaries: descriptive stats, per-year quartiles, histogram.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{HistogramBin, Observation, SummaryStats, YearDistribution};
use crate::error::DataShortfall;
use crate::math::{mean, quantile_sorted, sample_std_dev, sorted_copy};

/// Count, mean, sample std, and five-number summary of the rate column.
pub fn summary_stats(observations: &[Observation]) -> Result<SummaryStats, DataShortfall> {
    let (Some(first), Some(last)) = (observations.first(), observations.last()) else {
        return Err(DataShortfall::NoData);
    };

    let rates: Vec<f64> = observations.iter().map(|o| o.rate).collect();
    let sorted = sorted_copy(rates.iter().copied());
    let q = |p: f64| quantile_sorted(&sorted, p).ok_or(DataShortfall::NoData);

    Ok(SummaryStats {
        count: rates.len(),
        mean: mean(&rates).ok_or(DataShortfall::NoData)?,
        std_dev: sample_std_dev(&rates),
        min: q(0.0)?,
        q1: q(0.25)?,
        median: q(0.5)?,
        q3: q(0.75)?,
        max: q(1.0)?,
        first_date: first.date.min(last.date),
        last_date: first.date.max(last.date),
    })
}

/// Five-number summary for every calendar year, ascending.
pub fn year_distributions(observations: &[Observation]) -> Vec<YearDistribution> {
    if observations.is_empty() {
        return Vec::new();
    }

    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for o in observations {
        by_year.entry(o.date.year()).or_default().push(o.rate);
    }

    by_year
        .into_iter()
        .filter_map(|(year, rates)| {
            let sorted = sorted_copy(rates);
            Some(YearDistribution {
                year,
                count: sorted.len(),
                min: quantile_sorted(&sorted, 0.0)?,
                q1: quantile_sorted(&sorted, 0.25)?,
                median: quantile_sorted(&sorted, 0.5)?,
                q3: quantile_sorted(&sorted, 0.75)?,
                max: quantile_sorted(&sorted, 1.0)?,
            })
        })
        .collect()
}

/// Equal-width histogram of rates over `[min, max]`.
///
/// A constant series gets a unit-wide range centred on its value.
pub fn histogram(observations: &[Observation], bins: usize) -> Vec<HistogramBin> {
    if observations.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = observations
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), o| (lo.min(o.rate), hi.max(o.rate)));
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for o in observations {
        let idx = (((o.rate - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}
