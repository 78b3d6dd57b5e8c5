//! Subnet x parameter heatmap with moving-average smoothing.
//!
//! Rows are subnets, columns are integer parameter values `0..=max`. Colour
//! comes from the smoothed value; cells that had no observation but received
//! a smoothed value are hatched, cells with neither are left blank.

use super::renderer::{slot_label, DrawResult, RenderError, StaticChartRenderer};
use super::style::{ylorrd, FONT, GRID_GRAY, LABEL_SIZE, TICK_SIZE, TITLE_SIZE};
use crate::stats::StatsCalculator;
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;

const COLORBAR_STEPS: usize = 100;
const COLORBAR_WIDTH: u32 = 140;
const FOOTER_LINE_HEIGHT: i32 = 20;
/// Offsets of the hatch strokes across a unit cell
const HATCH_OFFSETS: [f64; 3] = [-0.5, 0.0, 0.5];

/// Corner points of the hatch strokes for the cell centred on `(x, y)`,
/// each stroke parallel to the cell diagonal and clipped to the cell.
fn hatch_strokes(x: f64, y: f64) -> Vec<[(f64, f64); 2]> {
    HATCH_OFFSETS
        .iter()
        .map(|&offset| {
            let (x0, y0) = (x - 0.5 + offset.max(0.0), y - 0.5 - offset.min(0.0));
            let (x1, y1) = (x + 0.5 + offset.min(0.0), y + 0.5 - offset.max(0.0));
            [(x0, y0), (x1, y1)]
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatCell {
    /// Raw data present; carries the smoothed value
    Observed(f64),
    /// No raw data, value filled in by smoothing
    Interpolated(f64),
    Empty,
}

#[derive(Debug, Clone)]
pub struct HeatmapGrid {
    subnets: Vec<u32>,
    raw: Vec<Vec<f64>>,
    smoothed: Vec<Vec<f64>>,
}

impl HeatmapGrid {
    /// Build the grid from `(param, value)` points per subnet.
    ///
    /// Parameters must be non-negative integers; they index grid columns.
    pub fn from_series(
        series: &BTreeMap<u32, Vec<(f64, f64)>>,
        smoothing_window: usize,
    ) -> Result<Self, RenderError> {
        let mut max_param = None;
        for &(param, _) in series.values().flatten() {
            if !param.is_finite() || param < 0.0 || param.fract() != 0.0 {
                return Err(RenderError::InvalidAxisValue {
                    axis: "x",
                    value: param,
                });
            }
            max_param = Some(max_param.map_or(param, |m: f64| m.max(param)));
        }
        let Some(max_param) = max_param else {
            return Err(RenderError::NoData("heatmap".to_string()));
        };
        let columns = max_param as usize + 1;

        let subnets: Vec<u32> = series.keys().copied().collect();
        let raw: Vec<Vec<f64>> = series
            .values()
            .map(|points| {
                let mut row = vec![f64::NAN; columns];
                for &(param, value) in points {
                    row[param as usize] = value;
                }
                row
            })
            .collect();
        let smoothed = raw
            .iter()
            .map(|row| StatsCalculator::centered_moving_average(row, smoothing_window))
            .collect();

        Ok(Self {
            subnets,
            raw,
            smoothed,
        })
    }

    pub fn subnets(&self) -> &[u32] {
        &self.subnets
    }

    pub fn columns(&self) -> usize {
        self.raw.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> HeatCell {
        let smoothed = self.smoothed[row][col];
        if self.raw[row][col].is_finite() {
            HeatCell::Observed(smoothed)
        } else if smoothed.is_finite() {
            HeatCell::Interpolated(smoothed)
        } else {
            HeatCell::Empty
        }
    }

    pub fn observed_count(&self) -> usize {
        self.raw.iter().flatten().filter(|v| v.is_finite()).count()
    }

    pub fn total_cells(&self) -> usize {
        self.subnets.len() * self.columns()
    }

    /// Share of observed cells, in percent.
    pub fn density_percent(&self) -> f64 {
        match self.total_cells() {
            0 => 0.0,
            total => self.observed_count() as f64 / total as f64 * 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeatmapChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub colorbar_desc: String,
    pub vmin: f64,
    pub vmax: f64,
    /// Lines printed under the chart
    pub description: Vec<String>,
    pub width: u32,
    pub height: u32,
}

impl HeatmapChart {
    pub fn new(title: &str, x_desc: &str, y_desc: &str, colorbar_desc: &str) -> Self {
        Self {
            title: title.to_string(),
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            colorbar_desc: colorbar_desc.to_string(),
            vmin: 0.0,
            vmax: 0.5,
            description: Vec::new(),
            width: 2000,
            height: 1200,
        }
    }

    pub fn render(&self, grid: &HeatmapGrid) -> Result<RgbImage, RenderError> {
        if grid.total_cells() == 0 {
            return Err(RenderError::NoData(self.title.clone()));
        }

        let rows = grid.subnets().len();
        let columns = grid.columns();

        StaticChartRenderer::render(self.width, self.height, |root| {
            let body = root.titled(&self.title, (FONT, f64::from(TITLE_SIZE + 4)))?;
            let (_, body_h) = body.dim_in_pixel();
            let footer_h = (self.description.len() as i32 + 1) * FOOTER_LINE_HEIGHT;
            let (plot_area, footer) = body.split_vertically(body_h as i32 - footer_h);
            let (plot_w, _) = plot_area.dim_in_pixel();
            let (main, bar) = plot_area.split_horizontally((plot_w - COLORBAR_WIDTH) as i32);

            // First subnet on the top row.
            let top_down: Vec<u32> = grid.subnets().iter().rev().copied().collect();
            let row_y = |r: usize| (rows - 1 - r) as f64;
            let windows: Vec<usize> = (0..columns).collect();
            let mut chart = ChartBuilder::on(&main)
                .caption(
                    format!(
                        "Data Density: {:.2}% ({} data points)",
                        grid.density_percent(),
                        grid.observed_count()
                    ),
                    (FONT, LABEL_SIZE),
                )
                .margin(10)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(
                    -0.5f64..(columns as f64 - 0.5),
                    -0.5f64..(rows as f64 - 0.5),
                )?;

            chart
                .configure_mesh()
                .light_line_style(TRANSPARENT)
                .bold_line_style(GRID_GRAY.mix(0.5))
                .x_labels(columns)
                .y_labels(rows)
                .y_label_formatter(&|y: &f64| slot_label(*y, &top_down))
                .x_label_formatter(&|x: &f64| slot_label(*x, &windows))
                .x_desc(self.x_desc.as_str())
                .y_desc(self.y_desc.as_str())
                .axis_desc_style((FONT, LABEL_SIZE))
                .label_style((FONT, TICK_SIZE))
                .draw()?;

            let cells = (0..rows).flat_map(|r| (0..columns).map(move |c| (r, c, grid.cell(r, c))));
            chart.draw_series(cells.clone().filter_map(|(r, c, cell)| {
                let value = match cell {
                    HeatCell::Observed(v) | HeatCell::Interpolated(v) => v,
                    HeatCell::Empty => return None,
                };
                let (x, y) = (c as f64, row_y(r));
                Some(Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    ylorrd(value, self.vmin, self.vmax).filled(),
                ))
            }))?;
            chart.draw_series(
                cells
                    .filter(|(_, _, cell)| matches!(cell, HeatCell::Interpolated(_)))
                    .flat_map(|(r, c, _)| hatch_strokes(c as f64, row_y(r)))
                    .map(|stroke| PathElement::new(stroke.to_vec(), BLACK.mix(0.4))),
            )?;

            self.draw_colorbar(&bar)?;

            let text_style = (FONT, f64::from(TICK_SIZE)).into_font().color(&BLACK);
            for (i, line) in self.description.iter().enumerate() {
                footer.draw_text(line, &text_style, (80, (i as i32 + 1) * FOOTER_LINE_HEIGHT))?;
            }

            Ok(())
        })
    }

    fn draw_colorbar(&self, area: &DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult {
        let mut bar = ChartBuilder::on(area)
            .margin_top(60)
            .margin_bottom(60)
            .margin_right(10)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..1f64, self.vmin..self.vmax)?;

        bar.configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_desc(self.colorbar_desc.as_str())
            .axis_desc_style((FONT, LABEL_SIZE))
            .label_style((FONT, TICK_SIZE))
            .draw()?;

        let step = (self.vmax - self.vmin) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|i| {
            let lo = self.vmin + step * i as f64;
            Rectangle::new(
                [(0.0, lo), (1.0, lo + step)],
                ylorrd(lo + step / 2.0, self.vmin, self.vmax).filled(),
            )
        }))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gini_points() -> BTreeMap<u32, Vec<(f64, f64)>> {
        BTreeMap::from([
            (1, vec![(0.0, 0.1), (2.0, 0.3)]),
            (4, vec![(4.0, 0.2)]),
        ])
    }

    #[test]
    fn grid_spans_every_parameter_up_to_max() {
        let grid = HeatmapGrid::from_series(&gini_points(), 1).unwrap();
        assert_eq!(grid.subnets(), &[1, 4]);
        assert_eq!(grid.columns(), 5);
        assert_eq!(grid.total_cells(), 10);
        assert_eq!(grid.observed_count(), 3);
        assert!((grid.density_percent() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn smoothing_marks_interpolated_cells() {
        let grid = HeatmapGrid::from_series(&gini_points(), 3).unwrap();

        assert_eq!(grid.cell(0, 0), HeatCell::Observed(0.1));
        match grid.cell(0, 1) {
            HeatCell::Interpolated(v) => assert!((v - 0.2).abs() < 1e-12),
            other => panic!("expected interpolated cell, got {other:?}"),
        }
        assert_eq!(grid.cell(0, 4), HeatCell::Empty);
        assert_eq!(grid.cell(1, 3), HeatCell::Interpolated(0.2));
        assert_eq!(grid.cell(1, 0), HeatCell::Empty);
    }

    #[test]
    fn without_smoothing_gaps_stay_empty() {
        let grid = HeatmapGrid::from_series(&gini_points(), 1).unwrap();
        assert_eq!(grid.cell(0, 1), HeatCell::Empty);
        assert_eq!(grid.cell(0, 2), HeatCell::Observed(0.3));
    }

    #[test]
    fn fractional_parameter_is_rejected() {
        let series = BTreeMap::from([(1, vec![(1.5, 0.2)])]);
        let err = HeatmapGrid::from_series(&series, 3).unwrap_err();
        assert!(matches!(err, RenderError::InvalidAxisValue { axis: "x", .. }));
    }

    #[test]
    fn hatch_strokes_stay_inside_the_cell() {
        let strokes = hatch_strokes(2.0, 1.0);
        assert_eq!(strokes.len(), HATCH_OFFSETS.len());
        assert!(strokes.contains(&[(1.5, 0.5), (2.5, 1.5)]));
        for [(x0, y0), (x1, y1)] in strokes {
            for (x, y) in [(x0, y0), (x1, y1)] {
                assert!((1.5..=2.5).contains(&x) && (0.5..=1.5).contains(&y));
            }
            // Parallel to the cell diagonal.
            assert!(((x1 - x0) - (y1 - y0)).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_series_has_no_grid() {
        let err = HeatmapGrid::from_series(&BTreeMap::new(), 3).unwrap_err();
        assert!(matches!(err, RenderError::NoData(_)));
    }
}
