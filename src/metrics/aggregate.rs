//! Calendar aggregation: annual and monthly means.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{AnnualAverage, MonthlyAverage, Observation};

/// Mean rate per calendar year, ascending by year.
pub fn annual_averages(observations: &[Observation]) -> Vec<AnnualAverage> {
    if observations.is_empty() {
        return Vec::new();
    }

    let mut groups: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for o in observations {
        let entry = groups.entry(o.date.year()).or_insert((0.0, 0));
        entry.0 += o.rate;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(year, (sum, count))| AnnualAverage {
            year,
            mean_rate: sum / count as f64,
            count,
        })
        .collect()
}

/// Mean rate per `(year, month)` that has data, ascending by year then month.
pub fn monthly_averages(observations: &[Observation]) -> Vec<MonthlyAverage> {
    if observations.is_empty() {
        return Vec::new();
    }

    let mut groups: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for o in observations {
        let entry = groups.entry((o.date.year(), o.date.month())).or_insert((0.0, 0));
        entry.0 += o.rate;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((year, month), (sum, count))| MonthlyAverage {
            year,
            month,
            mean_rate: sum / count as f64,
            count,
        })
        .collect()
}

/// One heatmap row: a year and its twelve monthly means (`None` = no data).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub year: i32,
    pub months: [Option<f64>; 12],
}

/// Pivot the sparse monthly table into a year × month grid.
pub fn monthly_grid(monthly: &[MonthlyAverage]) -> Vec<MonthlyRow> {
    let mut rows: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for m in monthly {
        if !(1..=12).contains(&m.month) {
            continue;
        }
        rows.entry(m.year).or_insert([None; 12])[(m.month - 1) as usize] = Some(m.mean_rate);
    }
    rows.into_iter()
        .map(|(year, months)| MonthlyRow { year, months })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(y: i32, m: u32, d: u32, rate: f64) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), rate)
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs(2020, 1, 2, 1.0),
            obs(2020, 1, 3, 2.0),
            obs(2020, 6, 1, 3.0),
            obs(2021, 2, 1, 2.5),
            obs(2021, 2, 2, 2.7),
        ]
    }

    #[test]
    fn annual_means_and_counts() {
        let obs = sample();
        let annual = annual_averages(&obs);
        assert_eq!(annual.len(), 2);
        assert_eq!(annual[0].year, 2020);
        assert!((annual[0].mean_rate - 2.0).abs() < 1e-9);
        assert!((annual[1].mean_rate - 2.6).abs() < 1e-9);
        let total: usize = annual.iter().map(|a| a.count).sum();
        assert_eq!(total, obs.len());
    }

    #[test]
    fn monthly_is_sparse_and_ordered() {
        let monthly = monthly_averages(&sample());
        let keys: Vec<(i32, u32)> = monthly.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2020, 1), (2020, 6), (2021, 2)]);
        assert!((monthly[0].mean_rate - 1.5).abs() < 1e-9);
    }

    #[test]
    fn grid_fills_gaps_with_none() {
        let grid = monthly_grid(&monthly_averages(&sample()));
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].year, 2020);
        assert!(grid[0].months[0].is_some());
        assert!(grid[0].months[1].is_none());
        assert!(grid[0].months[5].is_some());
        assert_eq!(grid[1].months.iter().filter(|m| m.is_some()).count(), 1);
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        assert!(annual_averages(&[]).is_empty());
        assert!(monthly_averages(&[]).is_empty());
        assert!(monthly_grid(&[]).is_empty());
    }
}
