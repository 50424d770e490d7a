//! Dashboard views and the chart data behind them.
//!
//! All series and bounds are computed here, outside the render call, so the
//! widget only draws and the data prep can be tested without a terminal.

use plotters::style::RGBColor;

use crate::app::pipeline::PipelineResult;
use crate::domain::{events_window, market_events, year_fraction};

/// One selectable dashboard visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Line,
    Rolling,
    Annual,
    Distribution,
    Heatmap,
    Histogram,
    Events,
    Volatility,
    Trend,
}

impl View {
    pub const ALL: [View; 9] = [
        View::Line,
        View::Rolling,
        View::Annual,
        View::Distribution,
        View::Heatmap,
        View::Histogram,
        View::Events,
        View::Volatility,
        View::Trend,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Line => "Line: T10YIE over time",
            View::Rolling => "Rolling mean vs daily",
            View::Annual => "Annual average bars",
            View::Distribution => "Distribution by year",
            View::Heatmap => "Heatmap (monthly averages)",
            View::Histogram => "Histogram (rate distribution)",
            View::Events => "Annotated events",
            View::Volatility => "Volatility (std dev)",
            View::Trend => "Linear regression trend",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// Series styling: keep the palette high-contrast for terminal readability.
pub const RATE_COLOR: RGBColor = RGBColor(0, 255, 255);
pub const FADED_COLOR: RGBColor = RGBColor(128, 128, 128);
pub const MEAN_COLOR: RGBColor = RGBColor(255, 0, 255);
pub const BAR_COLOR: RGBColor = RGBColor(0, 200, 255);
pub const TREND_COLOR: RGBColor = RGBColor(255, 0, 0);
pub const VOL_COLOR: RGBColor = RGBColor(221, 160, 221);
pub const EVENT_COLORS: [RGBColor; 4] = [
    RGBColor(255, 0, 0),
    RGBColor(255, 165, 0),
    RGBColor(0, 255, 0),
    RGBColor(160, 32, 240),
];

/// A box-plot glyph centred on `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGlyph {
    pub x: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Drawable primitives.
#[derive(Debug, Clone)]
pub enum Mark {
    Line { points: Vec<(f64, f64)>, color: RGBColor },
    Dots { points: Vec<(f64, f64)>, color: RGBColor },
    /// Filled rectangles `(x0, x1, y0, y1)`.
    Bars { bars: Vec<(f64, f64, f64, f64)>, color: RGBColor },
    Boxes { boxes: Vec<BoxGlyph>, color: RGBColor },
    VLine { x: f64, color: RGBColor },
}

/// Everything the chart widget needs for one view.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub marks: Vec<Mark>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: String,
    pub y_label: String,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
    /// Lines shown under the chart (series legend, annotations).
    pub legend: Vec<String>,
}

/// Build the chart for `view`, or `None` when there is nothing to draw
/// (no observations, or a view rendered as a table).
pub fn chart_data(view: View, result: &PipelineResult) -> Option<ChartData> {
    if result.is_empty() || view == View::Heatmap {
        return None;
    }

    let rates: Vec<(f64, f64)> = result
        .observations
        .iter()
        .map(|o| (o.year_fraction(), o.rate))
        .collect();

    let chart = match view {
        View::Line => time_chart(
            vec![Mark::Line { points: rates, color: RATE_COLOR }],
            "rate (%)",
            vec!["daily rate".to_string()],
        ),
        View::Rolling => {
            let mean: Vec<(f64, f64)> = result
                .metrics
                .rolling
                .iter()
                .map(|s| (year_fraction(s.date), s.mean))
                .collect();
            time_chart(
                vec![
                    Mark::Line { points: rates, color: FADED_COLOR },
                    Mark::Line { points: mean, color: MEAN_COLOR },
                ],
                "rate (%)",
                vec![
                    "grey: daily rate".to_string(),
                    format!("magenta: {}-obs average", result.metrics.window),
                ],
            )
        }
        View::Volatility => {
            let std: Vec<(f64, f64)> = result
                .metrics
                .rolling
                .iter()
                .map(|s| (year_fraction(s.date), s.std_dev))
                .collect();
            time_chart(
                vec![Mark::Line { points: std, color: VOL_COLOR }],
                "std dev (%)",
                vec![format!("{}-obs rolling standard deviation", result.metrics.window)],
            )
        }
        View::Annual => annual_chart(result),
        View::Distribution => distribution_chart(result),
        View::Histogram => histogram_chart(result),
        View::Events => events_chart(result),
        View::Trend => trend_chart(result),
        View::Heatmap => return None,
    };

    Some(chart)
}

fn time_chart(marks: Vec<Mark>, y_label: &str, legend: Vec<String>) -> ChartData {
    let x_bounds = bounds(mark_values(&marks, |p| p.0), 0.0);
    let y_bounds = bounds(mark_values(&marks, |p| p.1), 0.05);
    ChartData {
        marks,
        x_bounds,
        y_bounds,
        x_label: "year".to_string(),
        y_label: y_label.to_string(),
        fmt_x: fmt_year,
        fmt_y: fmt_rate,
        legend,
    }
}

fn annual_chart(result: &PipelineResult) -> ChartData {
    let annual = &result.metrics.annual;
    let top = annual.iter().map(|a| a.mean_rate).fold(0.0_f64, f64::max);
    let bottom = annual.iter().map(|a| a.mean_rate).fold(0.0_f64, f64::min);
    let bars = annual
        .iter()
        .map(|a| (a.year as f64 - 0.4, a.year as f64 + 0.4, 0.0, a.mean_rate))
        .collect();
    let first = annual.first().map(|a| a.year as f64).unwrap_or(0.0);
    let last = annual.last().map(|a| a.year as f64).unwrap_or(0.0);

    ChartData {
        marks: vec![Mark::Bars { bars, color: BAR_COLOR }],
        x_bounds: [first - 0.6, last + 0.6],
        y_bounds: bounds([bottom, top].into_iter(), 0.05),
        x_label: "year".to_string(),
        y_label: "avg rate (%)".to_string(),
        fmt_x: fmt_whole,
        fmt_y: fmt_rate,
        legend: annual
            .iter()
            .map(|a| format!("{}: {:.2}%", a.year, a.mean_rate))
            .collect(),
    }
}

fn distribution_chart(result: &PipelineResult) -> ChartData {
    let dist = &result.metrics.distributions;
    let boxes: Vec<BoxGlyph> = dist
        .iter()
        .map(|d| BoxGlyph {
            x: d.year as f64,
            min: d.min,
            q1: d.q1,
            median: d.median,
            q3: d.q3,
            max: d.max,
        })
        .collect();
    let first = dist.first().map(|d| d.year as f64).unwrap_or(0.0);
    let last = dist.last().map(|d| d.year as f64).unwrap_or(0.0);
    let y_bounds = bounds(dist.iter().flat_map(|d| [d.min, d.max]), 0.05);

    ChartData {
        marks: vec![Mark::Boxes { boxes, color: BAR_COLOR }],
        x_bounds: [first - 0.6, last + 0.6],
        y_bounds,
        x_label: "year".to_string(),
        y_label: "rate (%)".to_string(),
        fmt_x: fmt_whole,
        fmt_y: fmt_rate,
        legend: vec!["box: 25%-75%, line: median, whiskers: min-max".to_string()],
    }
}

fn histogram_chart(result: &PipelineResult) -> ChartData {
    let bins = &result.metrics.histogram;
    let bars = bins
        .iter()
        .map(|b| (b.lower, b.upper, 0.0, b.count as f64))
        .collect();
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let lo = bins.first().map(|b| b.lower).unwrap_or(0.0);
    let hi = bins.last().map(|b| b.upper).unwrap_or(1.0);

    ChartData {
        marks: vec![Mark::Bars { bars, color: RGBColor(0, 128, 128) }],
        x_bounds: bounds([lo, hi].into_iter(), 0.0),
        y_bounds: bounds([0.0, max_count].into_iter(), 0.05),
        x_label: "rate (%)".to_string(),
        y_label: "count".to_string(),
        fmt_x: fmt_rate,
        fmt_y: fmt_whole,
        legend: vec![format!("{} bins", bins.len())],
    }
}

fn events_chart(result: &PipelineResult) -> ChartData {
    let (start, end) = match events_window() {
        Some(w) => w,
        None => (result.observations[0].date, result.observations[result.observations.len() - 1].date),
    };
    let points: Vec<(f64, f64)> = result
        .observations
        .iter()
        .filter(|o| o.date >= start && o.date <= end)
        .map(|o| (o.year_fraction(), o.rate))
        .collect();
    let y_bounds = bounds(points.iter().map(|p| p.1), 0.05);

    let mut marks = vec![Mark::Line { points, color: RGBColor(70, 130, 180) }];
    let mut legend = Vec::new();
    for (i, event) in market_events().into_iter().enumerate() {
        let color = EVENT_COLORS[i % EVENT_COLORS.len()];
        marks.push(Mark::VLine { x: year_fraction(event.date), color });
        legend.push(format!("{}  {}", event.date, event.label));
    }

    ChartData {
        marks,
        x_bounds: [year_fraction(start), year_fraction(end)],
        y_bounds,
        x_label: "year".to_string(),
        y_label: "rate (%)".to_string(),
        fmt_x: fmt_year,
        fmt_y: fmt_rate,
        legend,
    }
}

fn trend_chart(result: &PipelineResult) -> ChartData {
    let origin = result.observations[0].date;
    let points: Vec<(f64, f64)> = result
        .observations
        .iter()
        .map(|o| ((o.date - origin).num_days() as f64, o.rate))
        .collect();
    let last_x = points.last().map(|p| p.0).unwrap_or(0.0);

    let mut marks = vec![Mark::Dots { points, color: RGBColor(70, 130, 180) }];
    let legend = match &result.metrics.trend {
        Ok(fit) => {
            marks.push(Mark::Line {
                points: vec![(0.0, fit.predict(0.0)), (last_x, fit.predict(last_x))],
                color: TREND_COLOR,
            });
            vec![format!("Trend line: {}", crate::report::trend_equation(fit))]
        }
        Err(e) => vec![format!("Trend line: {e}")],
    };

    let x_bounds = bounds(mark_values(&marks, |p| p.0), 0.0);
    let y_bounds = bounds(mark_values(&marks, |p| p.1), 0.05);
    ChartData {
        marks,
        x_bounds,
        y_bounds,
        x_label: format!("days since {origin}"),
        y_label: "rate (%)".to_string(),
        fmt_x: fmt_whole,
        fmt_y: fmt_rate,
        legend,
    }
}

fn mark_values<'a>(marks: &'a [Mark], pick: fn(&(f64, f64)) -> f64) -> impl Iterator<Item = f64> + 'a {
    marks.iter().flat_map(move |m| {
        let points: &[(f64, f64)] = match m {
            Mark::Line { points, .. } | Mark::Dots { points, .. } => points,
            _ => &[],
        };
        points.iter().map(pick)
    })
}

/// Finite `[min, max]` of `values`, padded by `pad` of the span.
///
/// Degenerate or empty input falls back to a unit range so Plotters can always
/// build a coordinate system.
pub fn bounds(values: impl Iterator<Item = f64>, pad: f64) -> [f64; 2] {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let p = ((hi - lo) * pad).max(0.0);
    [lo - p, hi + p]
}

fn fmt_year(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_whole(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_rate(v: f64) -> String {
    format!("{v:.2}")
}
