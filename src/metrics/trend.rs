//! Linear trend of the rate against days since the first observation.

use std::collections::BTreeSet;

use crate::domain::{Observation, TrendFit};
use crate::error::DataShortfall;
use crate::math::fit_line;

/// Distinct day offsets needed to pin down a line.
pub const MIN_TREND_DATES: usize = 2;

/// OLS fit of `rate ≈ slope * day_offset + intercept`, where `day_offset` is the
/// whole number of days since the earliest observation.
pub fn trend_fit(observations: &[Observation]) -> Result<TrendFit, DataShortfall> {
    let Some(origin) = observations.iter().map(|o| o.date).min() else {
        return Err(DataShortfall::NoData);
    };

    let offsets: Vec<i64> = observations.iter().map(|o| (o.date - origin).num_days()).collect();
    let distinct = offsets.iter().collect::<BTreeSet<_>>().len();
    if distinct < MIN_TREND_DATES {
        return Err(DataShortfall::InsufficientData {
            required: MIN_TREND_DATES,
            available: distinct,
        });
    }

    let xs: Vec<f64> = offsets.iter().map(|&d| d as f64).collect();
    let ys: Vec<f64> = observations.iter().map(|o| o.rate).collect();
    let line = fit_line(&xs, &ys).ok_or(DataShortfall::FitFailed)?;

    Ok(TrendFit {
        slope: line.slope,
        intercept: line.intercept,
        r_squared: line.r_squared,
        n: observations.len(),
        origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn recovers_exact_linear_series() {
        let start = NaiveDate::from_ymd_opt(2014, 1, 2).unwrap();
        // Business-day-like gaps: skip every 6th and 7th day.
        let obs: Vec<Observation> = (0..2500)
            .filter(|d| d % 7 < 5)
            .map(|d| Observation::new(start + Duration::days(d), 0.001 * d as f64 + 2.0))
            .collect();

        let fit = trend_fit(&obs).unwrap();
        assert!((fit.slope - 0.001).abs() < 1e-6);
        assert!((fit.intercept - 2.0).abs() < 1e-6);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.origin, start);
        assert_eq!(fit.n, obs.len());
    }

    #[test]
    fn empty_series_is_no_data() {
        assert_eq!(trend_fit(&[]), Err(DataShortfall::NoData));
    }

    #[test]
    fn non_finite_solution_is_a_failed_fit() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let obs = vec![
            Observation::new(d, 2.0),
            Observation::new(d + Duration::days(1), f64::INFINITY),
            Observation::new(d + Duration::days(2), 2.2),
        ];
        assert_eq!(trend_fit(&obs), Err(DataShortfall::FitFailed));
    }

    #[test]
    fn single_date_is_insufficient() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let obs = vec![Observation::new(d, 2.0)];
        assert_eq!(
            trend_fit(&obs),
            Err(DataShortfall::InsufficientData { required: 2, available: 1 })
        );
    }
}
