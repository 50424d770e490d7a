//! Ratatui-based terminal UI.
//!
//! The dashboard lists the available views on the left, renders the selected
//! chart (or the monthly heatmap table) on the right, and keeps extremes, the
//! trend equation and cleaning counts visible in a side panel.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::app::pipeline::{self, PipelineResult};
use crate::domain::{DEFAULT_EXPORT_PATH, RunConfig};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::io::cache::{CacheStatus, CleanCache};
use crate::metrics::monthly_grid;

mod plotters_chart;
pub mod views;

use plotters_chart::PlottersChart;
use views::{ChartData, View, chart_data};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Start the TUI.
///
/// The first load happens before the terminal is taken over, so a missing
/// source file is reported like any other CLI error.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    cache: CleanCache,
    result: PipelineResult,
    view: View,
    status: String,
}

impl App {
    fn new(config: RunConfig) -> Result<Self, AppError> {
        let mut cache = CleanCache::new();
        let (result, _) = pipeline::run_pipeline_cached(&config, &mut cache)?;
        let status = format!("Loaded {} observations.", result.observations.len());
        Ok(Self {
            config,
            cache,
            result,
            view: View::Line,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Down | KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('R') => {
                self.cache.invalidate();
                self.reload();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    /// Re-run the pipeline. On failure the previous result stays on screen.
    fn reload(&mut self) {
        match pipeline::run_pipeline_cached(&self.config, &mut self.cache) {
            Ok((result, status)) => {
                self.result = result;
                self.status = match status {
                    CacheStatus::Hit => "Source unchanged; reused cleaned data.".to_string(),
                    CacheStatus::Miss => {
                        format!("Reloaded {} observations.", self.result.observations.len())
                    }
                };
            }
            Err(err) => {
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn export(&mut self) {
        let path = self
            .config
            .export_annual
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPORT_PATH.into());
        self.status = match crate::io::export::write_annual_csv(&path, &self.result.metrics.annual) {
            Ok(()) => format!("Yearly averages written to {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("ie", Style::default().fg(Color::Cyan)),
            Span::raw(" - 10-Year Breakeven Inflation Expectation (T10YIE)"),
        ]));

        let period = self
            .result
            .metrics
            .summary
            .as_ref()
            .map(|s| format!("{} .. {}", s.first_date, s.last_date))
            .unwrap_or_else(|_| "-".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | period: {period} | n={} | window={}",
                self.result.source.display(),
                self.result.observations.len(),
                self.result.metrics.window,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(View::ALL.len() as u16 + 2), Constraint::Min(0)])
            .split(chunks[0]);

        self.draw_views(frame, side[0]);
        self.draw_details(frame, side[1]);

        if self.view == View::Heatmap {
            self.draw_heatmap(frame, chunks[1]);
        } else {
            self.draw_chart(frame, chunks[1]);
        }
    }

    fn draw_views(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = View::ALL.iter().map(|v| ListItem::new(v.title())).collect();
        let list = List::new(items)
            .block(Block::default().title("Views").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.view.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_details(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = Text::from(detail_lines(&self.result));
        let p = Paragraph::new(text).block(Block::default().title("Details").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = chart_data(self.view, &self.result) else {
            let msg = Paragraph::new("No data to display.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let legend_height = (data.legend.len() as u16).min(inner.height / 3);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(legend_height)])
            .split(inner);

        let (chart_rect, insets) = chart_layout(chunks[0]);
        frame.render_widget(PlottersChart { data: &data }, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, chunks[0], chart_rect, insets, &data);
        }

        let legend: Vec<Line> = data
            .legend
            .iter()
            .map(|l| Line::from(Span::styled(l.as_str(), Style::default().fg(Color::Gray))))
            .collect();
        frame.render_widget(Paragraph::new(legend), chunks[1]);
    }

    fn draw_heatmap(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(View::Heatmap.title()).borders(Borders::ALL);
        let grid = monthly_grid(&self.result.metrics.monthly);
        if grid.is_empty() {
            let msg = Paragraph::new("No data to display.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let (lo, hi) = grid
            .iter()
            .flat_map(|r| r.months.iter().flatten().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let header = Row::new(
            std::iter::once(Cell::from("year"))
                .chain(MONTHS.iter().map(|m| Cell::from(*m)))
                .collect::<Vec<_>>(),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = grid.iter().map(|row| {
            let cells = std::iter::once(Cell::from(row.year.to_string())).chain(row.months.iter().map(
                |v| match v {
                    Some(v) => Cell::from(format!("{v:.2}")).style(heat_style(*v, lo, hi)),
                    None => Cell::from("-"),
                },
            ));
            Row::new(cells.collect::<Vec<_>>())
        });

        let widths = std::iter::once(Constraint::Length(6)).chain(MONTHS.iter().map(|_| Constraint::Length(5)));
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓/Tab view  r reload  R force reload  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Side-panel text: extremes, trend equation and cleaning counts.
fn detail_lines(result: &PipelineResult) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match &result.metrics.extremes {
        Ok(e) => {
            lines.push(Line::from(format!("High: {:.2}% {}", e.highest.rate, e.highest.date)));
            lines.push(Line::from(format!("Low : {:.2}% {}", e.lowest.rate, e.lowest.date)));
        }
        Err(e) => lines.push(Line::from(format!("Extremes: {e}"))),
    }
    match &result.metrics.trend {
        Ok(t) => {
            lines.push(Line::from(crate::report::trend_equation(t)));
            lines.push(Line::from(format!("r²={:.4}", t.r_squared)));
        }
        Err(e) => lines.push(Line::from(format!("Trend: {e}"))),
    }
    let c = &result.cleaning;
    lines.push(Line::from(""));
    lines.push(Line::from(format!("rows read : {}", c.rows_read)));
    lines.push(Line::from(format!("rows used : {}", c.rows_used)));
    lines.push(Line::from(format!("rejected  : {}", c.rows_rejected())));
    lines.push(Line::from(format!("duplicates: {}", c.duplicates_removed)));
    lines.push(Line::from(format!("conflicts : {}", c.conflicting_dates)));
    lines
}

/// Yellow-to-blue cell shading for the heatmap.
fn heat_style(v: f64, lo: f64, hi: f64) -> Style {
    let t = if hi > lo { ((v - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    let bg = Color::Rgb(lerp(255, 37), lerp(255, 52), lerp(204, 148));
    let fg = if t < 0.5 { Color::Black } else { Color::White };
    Style::default().bg(bg).fg(fg)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, data: &ChartData) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = (data.fmt_x)(x0 + u * (x1 - x0));
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (data.fmt_y)(y0 + u * (y1 - y0));
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(data.x_label.as_str())
        .alignment(Alignment::Center)
        .style(style);
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(data.y_label.as_str()).style(style.add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
