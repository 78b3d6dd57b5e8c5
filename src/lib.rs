//! Subnet Charts - per-subnet CSV aggregation & static chart generation
//!
//! Loads a directory of experiment CSVs (one file per subnet), computes
//! grouped means over a measurement column and renders PNG charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipelines;
pub mod stats;
