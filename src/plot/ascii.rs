//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - primary series: `.` (connected)
//! - overlay series (rolling mean, trend line): `*`, drawn on top

use crate::app::pipeline::PipelineResult;
use crate::domain::{PlotKind, year_fraction};

/// Render one of the line plots for a pipeline result.
pub fn render_ascii_plot(result: &PipelineResult, kind: PlotKind, width: usize, height: usize) -> String {
    let rates: Vec<(f64, f64)> = result
        .observations
        .iter()
        .map(|o| (o.year_fraction(), o.rate))
        .collect();

    match kind {
        PlotKind::Rate => render_plot("rate (%)", &rates, None, width, height),
        PlotKind::Rolling => {
            let mean: Vec<(f64, f64)> = result
                .metrics
                .rolling
                .iter()
                .map(|s| (year_fraction(s.date), s.mean))
                .collect();
            let title = format!("rate (%) with {}-obs rolling mean *", result.metrics.window);
            render_plot(&title, &rates, Some(&mean), width, height)
        }
        PlotKind::Volatility => {
            let std: Vec<(f64, f64)> = result
                .metrics
                .rolling
                .iter()
                .map(|s| (year_fraction(s.date), s.std_dev))
                .collect();
            let title = format!("{}-obs rolling std dev (%)", result.metrics.window);
            render_plot(&title, &std, None, width, height)
        }
        PlotKind::Trend => {
            let line: Vec<(f64, f64)> = match (&result.metrics.trend, result.observations.first(), result.observations.last()) {
                (Ok(fit), Some(first), Some(last)) => vec![
                    (first.year_fraction(), fit.predict_date(first.date)),
                    (last.year_fraction(), fit.predict_date(last.date)),
                ],
                _ => Vec::new(),
            };
            let overlay = if line.is_empty() { None } else { Some(line.as_slice()) };
            render_plot("rate (%) with OLS trend *", &rates, overlay, width, height)
        }
    }
}

fn render_plot(
    title: &str,
    primary: &[(f64, f64)],
    overlay: Option<&[(f64, f64)]>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || primary.iter().chain(overlay.unwrap_or(&[]));
    let Some((x_min, x_max)) = range(all().map(|p| p.0)) else {
        return format!("Plot: {title} | no data\n");
    };
    let Some((y_min, y_max)) = range(all().map(|p| p.1)) else {
        return format!("Plot: {title} | no data\n");
    };
    let (x_min, x_max) = widen_degenerate(x_min, x_max);
    let (y_min, y_max) = widen_degenerate(y_min, y_max);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
    };

    draw_series(&mut grid, primary, &frame, '.', false);
    if let Some(overlay) = overlay {
        draw_series(&mut grid, overlay, &frame, '*', true);
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {title} | x=[{x_min:.2}, {x_max:.2}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn widen_degenerate(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], series: &[(f64, f64)], frame: &Frame, ch: char, overwrite: bool) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in series {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let cx = map_x(x, frame.x_min, frame.x_max, width);
        let cy = map_y(y, frame.y_min, frame.y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, cx, cy, ch, overwrite),
            None => grid[cy][cx] = ch,
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char, overwrite: bool) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if overwrite || *cell == ' ' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let series = [(0.0, 0.0), (1.0, 1.0)];
        let txt = render_plot("t", &series, None, 10, 5);
        let expected = concat!(
            "Plot: t | x=[0.00, 1.00] | y=[-0.05, 1.05]\n",
            "        ..\n",
            "      ..  \n",
            "    ..    \n",
            "  ..      \n",
            "..        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn overlay_is_drawn_on_top() {
        let series = [(0.0, 0.0), (1.0, 0.0)];
        let overlay = [(0.0, 0.0), (1.0, 0.0)];
        let txt = render_plot("t", &series, Some(&overlay), 10, 5);
        assert!(txt.contains("**********"));
        assert!(!txt.lines().skip(1).any(|l| l.contains('.')));
    }

    #[test]
    fn empty_series_reports_no_data() {
        assert_eq!(render_plot("rate", &[], None, 10, 5), "Plot: rate | no data\n");
    }
}
