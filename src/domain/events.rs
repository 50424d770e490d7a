//! Market events annotated on the events chart.

use chrono::NaiveDate;

use super::MarketEvent;

/// Events, in chronological order, with their `(year, month, day)`.
const EVENTS: [((i32, u32, u32), &str); 4] = [
    ((2020, 3, 11), "COVID-19 Pandemic Declared"),
    ((2022, 2, 24), "Russia-Ukraine Conflict"),
    ((2022, 3, 15), "Fed Rate Hike"),
    ((2022, 6, 1), "US Inflation Peaks"),
];

/// Window shown by the events chart.
pub const EVENTS_WINDOW: ((i32, u32, u32), (i32, u32, u32)) = ((2020, 1, 1), (2022, 12, 31));

pub fn market_events() -> Vec<MarketEvent> {
    EVENTS
        .iter()
        .filter_map(|&((y, m, d), label)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| MarketEvent { date, label })
        })
        .collect()
}

pub fn events_window() -> Option<(NaiveDate, NaiveDate)> {
    let ((y0, m0, d0), (y1, m1, d1)) = EVENTS_WINDOW;
    Some((NaiveDate::from_ymd_opt(y0, m0, d0)?, NaiveDate::from_ymd_opt(y1, m1, d1)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_chronological_and_inside_window() {
        let events = market_events();
        assert_eq!(events.len(), 4);
        let (start, end) = events_window().unwrap();
        for pair in events.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert!(events.iter().all(|e| e.date >= start && e.date <= end));
    }
}
