//! Plotters-powered chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use super::views::{ChartData, Mark};

/// Half-width of a box-plot glyph, in x units (years).
const BOX_HALF_WIDTH: f64 = 0.3;

/// Draws one [`ChartData`]; holds no state of its own.
pub struct PlottersChart<'a> {
    pub data: &'a ChartData,
}

impl<'a> Widget for PlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }

        let [x0, x1] = self.data.x_bounds;
        let [y0, y1] = self.data.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let data = self.data;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(data.x_label.as_str())
                .y_desc(data.y_label.as_str())
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (data.fmt_x)(*v))
                .y_label_formatter(&|v| (data.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for mark in &data.marks {
                match mark {
                    Mark::Line { points, color } => {
                        chart.draw_series(LineSeries::new(points.iter().copied(), color))?;
                    }
                    // `Circle` radii are mis-scaled by the ratatui backend, so scatter
                    // points are single pixels.
                    Mark::Dots { points, color } => {
                        chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), *color)))?;
                    }
                    Mark::Bars { bars, color } => {
                        chart.draw_series(bars.iter().map(|&(bx0, bx1, by0, by1)| {
                            Rectangle::new([(bx0, by0), (bx1, by1)], color.filled())
                        }))?;
                    }
                    Mark::Boxes { boxes, color } => {
                        chart.draw_series(boxes.iter().map(|b| {
                            Rectangle::new(
                                [(b.x - BOX_HALF_WIDTH, b.q1), (b.x + BOX_HALF_WIDTH, b.q3)],
                                color.stroke_width(1),
                            )
                        }))?;
                        chart.draw_series(boxes.iter().flat_map(|b| {
                            [
                                PathElement::new(vec![(b.x, b.min), (b.x, b.q1)], *color),
                                PathElement::new(vec![(b.x, b.q3), (b.x, b.max)], *color),
                                PathElement::new(
                                    vec![(b.x - BOX_HALF_WIDTH, b.median), (b.x + BOX_HALF_WIDTH, b.median)],
                                    WHITE,
                                ),
                            ]
                        }))?;
                    }
                    Mark::VLine { x, color } => {
                        chart.draw_series(std::iter::once(PathElement::new(vec![(*x, y0), (*x, y1)], *color)))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::views::BoxGlyph;

    fn fmt(v: f64) -> String {
        format!("{v:.1}")
    }

    fn chart(marks: Vec<Mark>) -> ChartData {
        ChartData {
            marks,
            x_bounds: [2019.4, 2021.6],
            y_bounds: [0.0, 3.0],
            x_label: "year".to_string(),
            y_label: "rate (%)".to_string(),
            fmt_x: fmt,
            fmt_y: fmt,
            legend: Vec::new(),
        }
    }

    fn render(data: &ChartData, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        PlottersChart { data }.render(area, &mut buf);
        buf
    }

    fn painted_cells(buf: &Buffer) -> usize {
        buf.content.iter().filter(|c| c.symbol() != " ").count()
    }

    #[test]
    fn bars_paint_the_buffer() {
        let data = chart(vec![Mark::Bars {
            bars: vec![(2019.6, 2020.4, 0.0, 1.5), (2020.6, 2021.4, 0.0, 2.5)],
            color: RGBColor(0, 200, 255),
        }]);
        assert!(painted_cells(&render(&data, 60, 20)) > 0);
    }

    #[test]
    fn boxes_paint_the_buffer() {
        let glyph = |x| BoxGlyph {
            x,
            min: 0.5,
            q1: 1.0,
            median: 1.5,
            q3: 2.0,
            max: 2.8,
        };
        let data = chart(vec![Mark::Boxes {
            boxes: vec![glyph(2020.0), glyph(2021.0)],
            color: RGBColor(0, 200, 255),
        }]);
        assert!(painted_cells(&render(&data, 60, 20)) > 0);
    }

    #[test]
    fn tiny_area_shows_a_hint() {
        let data = chart(Vec::new());
        let buf = render(&data, 10, 4);
        let first_row: String = (0..10u16).map(|x| buf[(x, 0u16)].symbol().to_string()).collect();
        assert_eq!(first_row, "Chart area");
    }
}
