//! Trailing-window statistics.

use crate::domain::{Observation, RollingStat};
use crate::math::{mean, sample_std_dev};

/// Rolling mean and sample standard deviation over the last `window` points.
///
/// Index `i` uses `observations[i + 1 - min(i + 1, window) ..= i]`: an expanding
/// window until `window` points are available, a fixed one afterwards. The
/// output is aligned one-to-one with the input.
pub fn rolling_stats(observations: &[Observation], window: usize) -> Vec<RollingStat> {
    if observations.is_empty() {
        return Vec::new();
    }
    let window = window.max(1);
    let rates: Vec<f64> = observations.iter().map(|o| o.rate).collect();

    observations
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let start = (i + 1).saturating_sub(window);
            let slice = &rates[start..=i];
            RollingStat {
                date: o.date,
                mean: mean(slice).unwrap_or(o.rate),
                std_dev: sample_std_dev(slice),
                window_len: slice.len(),
            }
        })
        .collect()
}
