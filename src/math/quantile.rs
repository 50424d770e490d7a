//! Order statistics.

/// Linear-interpolated quantile of an ascending-sorted slice (`q` in `[0, 1]`).
///
/// Position `q * (n - 1)` is interpolated between its neighbours, the same
/// convention spreadsheet `PERCENTILE.INC` uses. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sort a copy of `values` ascending (values are expected to be finite).
pub fn sorted_copy(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.into_iter().collect();
    v.sort_by(f64::total_cmp);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_between_neighbours() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&v, 1.0), Some(4.0));
        assert!((quantile_sorted(&v, 0.5).unwrap() - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&v, 0.25).unwrap() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn empty_and_out_of_range() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[1.0], 1.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.75), Some(7.0));
    }
}
