//! Highest and lowest observations.

use crate::domain::{Extremes, Observation};
use crate::error::DataShortfall;

/// Scan for the maximum and minimum rate.
///
/// Ties go to the earliest date, whatever the input order.
pub fn extremes(observations: &[Observation]) -> Result<Extremes, DataShortfall> {
    let mut iter = observations.iter();
    let Some(&first) = iter.next() else {
        return Err(DataShortfall::NoData);
    };

    let mut highest = first;
    let mut lowest = first;
    for &o in iter {
        if o.rate > highest.rate || (o.rate == highest.rate && o.date < highest.date) {
            highest = o;
        }
        if o.rate < lowest.rate || (o.rate == lowest.rate && o.date < lowest.date) {
            lowest = o;
        }
    }

    Ok(Extremes { highest, lowest })
}
