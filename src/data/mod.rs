//! Input tables.
pub mod dataset;

pub use dataset::{Dataset, DatasetError};
