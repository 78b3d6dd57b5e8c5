//! Data module - CSV loading and grouped aggregation

mod loader;
mod model;
mod processor;

pub use loader::{subnet_from_filename, DataLoader, LoaderError};
pub use model::{Dataset, ParamValue};
pub use processor::{
    Aggregate, AggregateError, AggregateSpec, DataProcessor, GroupKey, GroupMean, RowFilter,
};
