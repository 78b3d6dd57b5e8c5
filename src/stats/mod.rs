//! Stats module - Descriptive statistics and smoothing

mod calculator;

pub use calculator::{StatsCalculator, SummaryStats};
