//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and metrics code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::PipelineResult;
use crate::domain::{AnnualAverage, Extremes, MonthlyAverage, SummaryStats, TrendFit};
use crate::error::DataShortfall;
use crate::io::ingest::CleaningReport;
use crate::metrics::monthly_grid;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format the full run summary (cleaning + statistics + tables).
pub fn format_run_summary(result: &PipelineResult) -> String {
    let mut out = String::new();

    out.push_str("=== ie - 10-Year Breakeven Inflation Expectation (T10YIE) ===\n");
    out.push_str(&format!("Source: {}\n", result.source.display()));
    out.push_str(&format_cleaning(&result.cleaning));

    out.push_str("\nSummary:\n");
    out.push_str(&format_summary(&result.metrics.summary));

    out.push_str("\nExtremes:\n");
    out.push_str(&format_extremes(&result.metrics.extremes));

    out.push_str("\nTrend (OLS, rate vs days since first observation):\n");
    out.push_str(&format_trend(&result.metrics.trend));

    out.push_str("\nAnnual averages:\n");
    out.push_str(&format_annual_table(&result.metrics.annual));

    out.push_str("\nMonthly averages (%):\n");
    out.push_str(&format_monthly_grid(&result.metrics.monthly));

    out
}

pub fn format_cleaning(report: &CleaningReport) -> String {
    format!(
        "Rows: read={} used={} | rejected={} (dates={}, rates={}, malformed={}) | duplicates={} | conflicting dates={}\n",
        report.rows_read,
        report.rows_used,
        report.rows_rejected(),
        report.invalid_dates,
        report.invalid_rates,
        report.malformed_records,
        report.duplicates_removed,
        report.conflicting_dates,
    )
}

pub fn format_summary(summary: &Result<SummaryStats, DataShortfall>) -> String {
    let s = match summary {
        Ok(s) => s,
        Err(e) => return format!("  ({e})\n"),
    };
    let mut out = String::new();
    out.push_str(&format!("  period: {} .. {}\n", s.first_date, s.last_date));
    out.push_str(&format!("  count : {}\n", s.count));
    out.push_str(&format!("  mean  : {:.4}\n", s.mean));
    out.push_str(&format!("  std   : {:.4}\n", s.std_dev));
    out.push_str(&format!("  min   : {:.4}\n", s.min));
    out.push_str(&format!("  25%   : {:.4}\n", s.q1));
    out.push_str(&format!("  50%   : {:.4}\n", s.median));
    out.push_str(&format!("  75%   : {:.4}\n", s.q3));
    out.push_str(&format!("  max   : {:.4}\n", s.max));
    out
}

pub fn format_extremes(extremes: &Result<Extremes, DataShortfall>) -> String {
    match extremes {
        Ok(e) => format!(
            "  Highest: {:.2}% on {}\n  Lowest: {:.2}% on {}\n",
            e.highest.rate, e.highest.date, e.lowest.rate, e.lowest.date
        ),
        Err(e) => format!("  ({e})\n"),
    }
}

pub fn format_trend(trend: &Result<TrendFit, DataShortfall>) -> String {
    match trend {
        Ok(t) => format!(
            "  {} | r²={:.4} | n={} | day 0 = {}\n",
            trend_equation(t),
            t.r_squared,
            t.n,
            t.origin
        ),
        Err(e) => format!("  ({e})\n"),
    }
}

/// `y=0.00012x + 1.85`, as shown in the chart legend.
pub fn trend_equation(t: &TrendFit) -> String {
    format!("y={:.5}x + {:.2}", t.slope, t.intercept)
}

pub fn format_annual_table(annual: &[AnnualAverage]) -> String {
    if annual.is_empty() {
        return "  (no data)\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!("{:<6} {:>8} {:>6}\n", "year", "rate", "n"));
    out.push_str(&format!("{:-<6} {:-<8} {:-<6}\n", "", "", ""));
    for a in annual {
        out.push_str(&format!("{:<6} {:>8.4} {:>6}\n", a.year, a.mean_rate, a.count));
    }
    out
}

pub fn format_monthly_grid(monthly: &[MonthlyAverage]) -> String {
    let grid = monthly_grid(monthly);
    if grid.is_empty() {
        return "  (no data)\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!("{:<6}", "year"));
    for m in MONTHS {
        out.push_str(&format!(" {m:>5}"));
    }
    out.push('\n');
    for row in grid {
        let mut line = format!("{:<6}", row.year);
        for v in row.months {
            match v {
                Some(v) => line.push_str(&format!(" {v:>5.2}")),
                None => line.push_str(&format!(" {:>5}", "-")),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
