//! Static Chart Renderer
//! Draws charts into an in-memory RGB buffer and writes them out as PNG.

use image::RgbImage;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No data to plot: {0}")]
    NoData(String),
    #[error("Invalid value on {axis} axis: {value}")]
    InvalidAxisValue { axis: &'static str, value: f64 },
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Rendered buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub(crate) type DrawResult = Result<(), Box<dyn StdError>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a `width` x `height` image on a white background.
    pub(crate) fn render<F>(width: u32, height: u32, draw: F) -> Result<RgbImage, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult,
    {
        let draw_err = |e: &dyn StdError| RenderError::Draw(e.to_string());
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| draw_err(&e))?;
            draw(&root).map_err(|e| draw_err(e.as_ref()))?;
            root.present().map_err(|e| draw_err(&e))?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer { width, height })
    }

    /// Write `img` to `output_dir/file_name`, creating the directory if
    /// needed and replacing any existing file.
    pub fn save_png(
        img: &RgbImage,
        output_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, RenderError> {
        fs::create_dir_all(output_dir).map_err(|source| RenderError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let path = output_dir.join(file_name);
        img.save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| RenderError::Write {
                path: path.clone(),
                source,
            })?;

        info!(
            "Wrote {}x{} chart to {}",
            img.width(),
            img.height(),
            path.display()
        );
        Ok(path)
    }
}

/// Label for a tick at `x` on a categorical axis, where category `i` sits
/// at `x == i`. Ticks between categories get no label.
pub(crate) fn slot_label<T: ToString>(x: f64, labels: &[T]) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels
        .get(idx as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}

/// Short tick text for a continuous axis: three significant digits, no
/// trailing zeros.
pub(crate) fn tick_label(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{}", v);
    }
    let magnitude = v.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, v);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// `(min, max)` of the finite values, padded for headroom. Falls back to
/// `(0, 1)` when nothing is finite.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        let half = if min == 0.0 { 1.0 } else { min.abs() * 0.5 };
        return (min - half, max + half);
    }
    let span = max - min;
    (min - span * pad, max + span * pad)
}

/// Multiplicative padding for a strictly positive log axis.
pub(crate) fn padded_log_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.1, 10.0);
    }
    (min / 1.5, max * 1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_creates_directory_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("plots");

        let first = RgbImage::from_pixel(4, 3, image::Rgb([255, 0, 0]));
        let path = StaticChartRenderer::save_png(&first, &out, "chart.png").unwrap();
        assert_eq!(path, out.join("chart.png"));
        assert!(path.is_file());

        let second = RgbImage::from_pixel(8, 2, image::Rgb([0, 0, 255]));
        StaticChartRenderer::save_png(&second, &out, "chart.png").unwrap();

        let reread = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reread.dimensions(), (8, 2));
        assert_eq!(reread.get_pixel(0, 0), &image::Rgb([0, 0, 255]));
    }

    #[test]
    fn slot_labels_only_on_integer_ticks() {
        let subnets = [3, 7, 12];
        assert_eq!(slot_label(0.0, &subnets), "3");
        assert_eq!(slot_label(2.0, &subnets), "12");
        assert_eq!(slot_label(0.5, &subnets), "");
        assert_eq!(slot_label(1.5, &subnets), "");
        assert_eq!(slot_label(3.0, &subnets), "");
        assert_eq!(slot_label(-1.0, &subnets), "");
    }

    #[test]
    fn tick_labels_drop_float_noise() {
        assert_eq!(tick_label(0.30000000000000004), "0.3");
        assert_eq!(tick_label(0.6000000000000001), "0.6");
        assert_eq!(tick_label(0.0125), "0.0125");
        assert_eq!(tick_label(2.5), "2.5");
        assert_eq!(tick_label(150.0), "150");
        assert_eq!(tick_label(12345.6), "12346");
        assert_eq!(tick_label(0.0), "0");
    }

    #[test]
    fn range_padding() {
        assert_eq!(padded_range([0.0, 10.0], 0.1), (-1.0, 11.0));
        assert_eq!(padded_range([4.0], 0.1), (2.0, 6.0));
        assert_eq!(padded_range([f64::NAN], 0.1), (0.0, 1.0));
    }

    #[test]
    fn log_range_ignores_non_positive() {
        let (lo, hi) = padded_log_range([0.0, -3.0, 2.0, 30.0]);
        assert!((lo - 2.0 / 1.5).abs() < 1e-12);
        assert!((hi - 45.0).abs() < 1e-12);
    }
}
