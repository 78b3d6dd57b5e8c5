//! Fixed colours, fonts and the heatmap colour scale.

use plotters::style::RGBColor;

pub const FONT: &str = "sans-serif";
pub const TITLE_SIZE: u32 = 24;
pub const LABEL_SIZE: u32 = 16;
pub const TICK_SIZE: u32 = 12;

// Bar chart
pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const NAVY: RGBColor = RGBColor(0, 0, 128);
pub const LIGHT_GRAY: RGBColor = RGBColor(211, 211, 211);
pub const GRID_GRAY: RGBColor = RGBColor(128, 128, 128);

// Paired bars (first / second series)
pub const PAIR_FIRST: RGBColor = RGBColor(0, 0, 255);
pub const PAIR_SECOND: RGBColor = RGBColor(255, 0, 0);
pub const PAIR_OPACITY: f64 = 0.7;

/// Line series colours, cycled by subnet index
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

// Yellow-orange-red sequential scale
const YLORRD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

/// Map `value` in `[vmin, vmax]` onto the yellow-orange-red scale.
///
/// Values outside the range are clamped.
pub fn ylorrd(value: f64, vmin: f64, vmax: f64) -> RGBColor {
    let span = vmax - vmin;
    let t = if span > 0.0 {
        ((value - vmin) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let scaled = t * (YLORRD.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(YLORRD.len() - 1);
    let frac = scaled - lower as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r0, g0, b0) = YLORRD[lower];
    let (r1, g1, b1) = YLORRD[upper];
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_endpoints_and_clamping() {
        assert_eq!(ylorrd(0.0, 0.0, 0.5), RGBColor(255, 255, 204));
        assert_eq!(ylorrd(0.5, 0.0, 0.5), RGBColor(128, 0, 38));
        assert_eq!(ylorrd(-1.0, 0.0, 0.5), ylorrd(0.0, 0.0, 0.5));
        assert_eq!(ylorrd(3.0, 0.0, 0.5), ylorrd(0.5, 0.0, 0.5));
    }

    #[test]
    fn scale_hits_interior_stops() {
        // 0.25 of [0, 0.5] is exactly the middle stop
        assert_eq!(ylorrd(0.25, 0.0, 0.5), RGBColor(253, 141, 60));
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), series_color(PALETTE.len()));
    }
}
