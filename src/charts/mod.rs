//! Charts module - Static PNG chart rendering

mod bar;
mod heatmap;
mod line;
mod renderer;
mod style;

pub use bar::{BarChart, PairedBarChart};
pub use heatmap::{HeatCell, HeatmapChart, HeatmapGrid};
pub use line::LineChart;
pub use renderer::{RenderError, StaticChartRenderer};
pub use style::{series_color, ylorrd, PALETTE};
