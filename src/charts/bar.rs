//! Bar charts keyed by subnet: a single series with value labels, and a
//! paired comparison of two series.

use super::renderer::{slot_label, RenderError, StaticChartRenderer};
use super::style::{
    FONT, GRID_GRAY, LABEL_SIZE, LIGHT_GRAY, NAVY, PAIR_FIRST, PAIR_OPACITY, PAIR_SECOND,
    SKY_BLUE, TICK_SIZE, TITLE_SIZE,
};
use image::RgbImage;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::{BTreeMap, BTreeSet};

const BAR_HALF_WIDTH: f64 = 0.4;
const PAIR_BAR_WIDTH: f64 = 0.35;

/// Upper bound of a value axis that starts at zero.
fn bar_y_max<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let max = values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// One bar per subnet.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub width: u32,
    pub height: u32,
}

impl BarChart {
    pub fn new(title: &str, x_desc: &str, y_desc: &str) -> Self {
        Self {
            title: title.to_string(),
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            width: 1200,
            height: 700,
        }
    }

    pub fn render(&self, values: &BTreeMap<u32, f64>) -> Result<RgbImage, RenderError> {
        if values.is_empty() {
            return Err(RenderError::NoData(self.title.clone()));
        }

        let subnets: Vec<u32> = values.keys().copied().collect();
        let n = subnets.len();
        let y_max = bar_y_max(values.values());

        StaticChartRenderer::render(self.width, self.height, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&self.title, (FONT, TITLE_SIZE))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(80)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&|x: &f64| slot_label(*x, &subnets))
                .y_label_formatter(&|y: &f64| format!("{:.0}", y))
                .light_line_style(LIGHT_GRAY.mix(0.5))
                .bold_line_style(LIGHT_GRAY)
                .x_desc(self.x_desc.as_str())
                .y_desc(self.y_desc.as_str())
                .axis_desc_style((FONT, LABEL_SIZE))
                .label_style((FONT, TICK_SIZE))
                .draw()?;

            chart.draw_series(values.values().enumerate().map(|(i, &v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)],
                    SKY_BLUE.filled(),
                )
            }))?;
            chart.draw_series(values.values().enumerate().map(|(i, &v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)],
                    NAVY.stroke_width(2),
                )
            }))?;

            let label_style = (FONT, f64::from(TICK_SIZE))
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(values.values().enumerate().map(|(i, &v)| {
                Text::new(format!("{:.2}", v), (i as f64, v), label_style.clone())
            }))?;

            Ok(())
        })
    }
}

/// Two bars per subnet, e.g. optimal vs non-optimal runs.
///
/// A subnet missing from one series gets no bar for that series.
#[derive(Debug, Clone)]
pub struct PairedBarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub first_label: String,
    pub second_label: String,
    pub width: u32,
    pub height: u32,
}

impl PairedBarChart {
    pub fn new(title: &str, x_desc: &str, y_desc: &str, first: &str, second: &str) -> Self {
        Self {
            title: title.to_string(),
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            first_label: first.to_string(),
            second_label: second.to_string(),
            width: 1500,
            height: 800,
        }
    }

    pub fn render(
        &self,
        first: &BTreeMap<u32, f64>,
        second: &BTreeMap<u32, f64>,
    ) -> Result<RgbImage, RenderError> {
        let subnets: Vec<u32> = first
            .keys()
            .chain(second.keys())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if subnets.is_empty() {
            return Err(RenderError::NoData(self.title.clone()));
        }

        let n = subnets.len();
        let y_max = bar_y_max(first.values().chain(second.values()));

        StaticChartRenderer::render(self.width, self.height, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&self.title, (FONT, TITLE_SIZE))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(80)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&|x: &f64| slot_label(*x, &subnets))
                .light_line_style(GRID_GRAY.mix(0.1))
                .x_desc(self.x_desc.as_str())
                .y_desc(self.y_desc.as_str())
                .axis_desc_style((FONT, LABEL_SIZE))
                .label_style((FONT, TICK_SIZE))
                .draw()?;

            let bars = [
                (first, &self.first_label, PAIR_FIRST, -PAIR_BAR_WIDTH),
                (second, &self.second_label, PAIR_SECOND, 0.0),
            ];
            for (series, label, color, offset) in bars {
                let style = color.mix(PAIR_OPACITY).filled();
                chart
                    .draw_series(subnets.iter().enumerate().filter_map(|(i, subnet)| {
                        let v = *series.get(subnet)?;
                        let x = i as f64 + offset;
                        Some(Rectangle::new([(x, 0.0), (x + PAIR_BAR_WIDTH, v)], style))
                    }))?
                    .label(label.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], style));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((FONT, TICK_SIZE))
                .draw()?;

            Ok(())
        })
    }
}
