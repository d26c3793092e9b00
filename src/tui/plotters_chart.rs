//! Plotters-powered bar chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call (see
/// `ChartView`), so `render()` only draws.
pub struct MetricBarChart<'a> {
    /// One `(x, value)` pair per bar; `x` is the day index within the window.
    pub bars: &'a [(f64, f64)],
    /// Date label per bar index.
    pub dates: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    /// Formatting of y tick labels.
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for MetricBarChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let date_at = |x: f64| -> String {
                let idx = x.round();
                if idx < 0.0 {
                    return String::new();
                }
                self.dates.get(idx as usize).cloned().unwrap_or_default()
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| date_at(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Vertical strokes read better than filled rectangles on a braille canvas.
            let bar_color = RGBColor(0, 255, 255);
            chart.draw_series(
                self.bars
                    .iter()
                    .map(|&(x, y)| PathElement::new(vec![(x, y0), (x, y)], bar_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
