//! Multi-series line chart, one series per subnet, with optional log axes.

use super::renderer::{
    padded_log_range, padded_range, tick_label, DrawResult, RenderError, StaticChartRenderer,
};
use super::style::{series_color, FONT, GRID_GRAY, LABEL_SIZE, TICK_SIZE, TITLE_SIZE};
use image::RgbImage;
use log::debug;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;

const AXIS_LABELS: usize = 6;

#[derive(Debug, Clone)]
pub struct LineChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Legend entries read `"{series_prefix} {subnet}"`
    pub series_prefix: String,
    pub log_x: bool,
    pub log_y: bool,
    pub width: u32,
    pub height: u32,
}

impl LineChart {
    pub fn new(title: &str, x_desc: &str, y_desc: &str) -> Self {
        Self {
            title: title.to_string(),
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            series_prefix: "Subnet".to_string(),
            log_x: false,
            log_y: false,
            width: 1200,
            height: 800,
        }
    }

    pub fn log_log(mut self) -> Self {
        self.log_x = true;
        self.log_y = true;
        self
    }

    /// Points that can be placed on the configured axes.
    ///
    /// A log axis cannot show zero or negative values, so those points are
    /// dropped.
    pub fn plottable(
        &self,
        series: &BTreeMap<u32, Vec<(f64, f64)>>,
    ) -> BTreeMap<u32, Vec<(f64, f64)>> {
        series
            .iter()
            .filter_map(|(&subnet, points)| {
                let kept: Vec<(f64, f64)> = points
                    .iter()
                    .copied()
                    .filter(|&(x, y)| {
                        x.is_finite()
                            && y.is_finite()
                            && (!self.log_x || x > 0.0)
                            && (!self.log_y || y > 0.0)
                    })
                    .collect();
                if kept.len() < points.len() {
                    debug!(
                        "Subnet {}: dropped {} point(s) not representable on the axes",
                        subnet,
                        points.len() - kept.len()
                    );
                }
                (!kept.is_empty()).then_some((subnet, kept))
            })
            .collect()
    }

    pub fn render(&self, series: &BTreeMap<u32, Vec<(f64, f64)>>) -> Result<RgbImage, RenderError> {
        let series = self.plottable(series);
        if series.is_empty() {
            return Err(RenderError::NoData(self.title.clone()));
        }

        let xs = || series.values().flatten().map(|&(x, _)| x);
        let ys = || series.values().flatten().map(|&(_, y)| y);
        let (x0, x1) = if self.log_x {
            padded_log_range(xs())
        } else {
            padded_range(xs(), 0.05)
        };
        let (y0, y1) = if self.log_y {
            padded_log_range(ys())
        } else {
            padded_range(ys(), 0.1)
        };

        StaticChartRenderer::render(self.width, self.height, |root| {
            match (self.log_x, self.log_y) {
                (true, true) => self.draw(root, &series, (x0..x1).log_scale(), (y0..y1).log_scale()),
                (true, false) => self.draw(root, &series, (x0..x1).log_scale(), y0..y1),
                (false, true) => self.draw(root, &series, x0..x1, (y0..y1).log_scale()),
                (false, false) => self.draw(root, &series, x0..x1, y0..y1),
            }
        })
    }

    fn draw<X, Y>(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        series: &BTreeMap<u32, Vec<(f64, f64)>>,
        x_spec: X,
        y_spec: Y,
    ) -> DrawResult
    where
        X: AsRangedCoord<Value = f64>,
        Y: AsRangedCoord<Value = f64>,
        X::CoordDescType: ValueFormatter<f64>,
        Y::CoordDescType: ValueFormatter<f64>,
    {
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_spec, y_spec)?;

        chart
            .configure_mesh()
            .light_line_style(GRID_GRAY.mix(0.1))
            .bold_line_style(GRID_GRAY.mix(0.3))
            .x_labels(AXIS_LABELS)
            .y_labels(AXIS_LABELS)
            .x_label_formatter(&|x: &f64| tick_label(*x))
            .y_label_formatter(&|y: &f64| tick_label(*y))
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .axis_desc_style((FONT, LABEL_SIZE))
            .label_style((FONT, TICK_SIZE))
            .draw()?;

        for (i, (subnet, points)) in series.iter().enumerate() {
            let color = series_color(i);
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(format!("{} {}", self.series_prefix, subnet))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart.draw_series(
                points
                    .iter()
                    .map(|&point| Circle::new(point, 4, color.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, TICK_SIZE))
            .draw()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> BTreeMap<u32, Vec<(f64, f64)>> {
        BTreeMap::from([
            (1, vec![(0.0, 5.0), (0.1, 4.0), (1.0, 2.0)]),
            (2, vec![(0.0, 8.0)]),
        ])
    }

    #[test]
    fn linear_axes_keep_every_point() {
        let chart = LineChart::new("Sweep", "Margin", "Age");
        assert_eq!(chart.plottable(&sweep()), sweep());
    }

    #[test]
    fn log_axes_drop_non_positive_points() {
        let chart = LineChart::new("Sweep", "Margin", "Age").log_log();
        let kept = chart.plottable(&sweep());
        assert_eq!(kept, BTreeMap::from([(1, vec![(0.1, 4.0), (1.0, 2.0)])]));
    }

    #[test]
    fn nothing_plottable_is_an_error() {
        let chart = LineChart::new("Sweep", "Margin", "Age").log_log();
        let only_zero = BTreeMap::from([(4, vec![(0.0, 1.0)])]);
        assert!(matches!(chart.render(&only_zero), Err(RenderError::NoData(_))));
    }
}
