//! Plotters-powered airfoil chart widget for Ratatui.
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
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct FoilPlottersChart<'a> {
    /// Fitted upper and lower curves.
    pub curves: [&'a [(f64, f64)]; 2],
    /// Upper and lower control polygons (empty when hidden).
    pub polygons: [&'a [(f64, f64)]; 2],
    /// Input samples of both surfaces.
    pub samples: &'a [(f64, f64)],
    /// X bounds (chord).
    pub x_bounds: [f64; 2],
    /// Y bounds.
    pub y_bounds: [f64; 2],
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for FoilPlottersChart<'a> {
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
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("x/c")
                .y_desc("y/c")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_colors = [RGBColor(0, 255, 255), RGBColor(255, 0, 255)]; // cyan, magenta
            let polygon_color = RGBColor(255, 255, 0); // yellow
            let samples_color = WHITE;

            for polygon in self.polygons {
                chart.draw_series(LineSeries::new(polygon.iter().copied(), &polygon_color))?;
                // Circle markers are mis-scaled by the ratatui backend; pixels stay crisp.
                chart.draw_series(polygon.iter().map(|&(x, y)| Pixel::new((x, y), polygon_color)))?;
            }
            for (curve, color) in self.curves.iter().zip(curve_colors) {
                chart.draw_series(LineSeries::new(curve.iter().copied(), &color))?;
            }
            chart.draw_series(self.samples.iter().map(|&(x, y)| Pixel::new((x, y), samples_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
