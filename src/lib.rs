// Constraint-based causal discovery over an in-memory numeric table.
// The library surface is plain Rust; with the `python` feature, `_core`
// exposes the two analyses to Python as well.

pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod search;
pub mod stats;

#[cfg(feature = "python")]
mod bindings;

pub use config::{ConfigError, SearchConfig};
pub use data::{Dataset, DatasetError};
pub use error::SearchError;
pub use graph::{EdgeMark, VarId, VarPair};
pub use search::{run_directed_analysis, run_undirected_analysis, CausalSearch, PathRecord, SearchOutcome, StrengthReport};
pub use stats::{IndependenceOracle, PartialCorrelationTest, StatError, TestOutcome};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// --- Module Definition ---
/// This function defines the `_core` Python module.
/// The name `_core` is chosen to indicate it's an internal, compiled component.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<bindings::python::PyPathRecord>()?;
    m.add_function(wrap_pyfunction!(bindings::python::run_directed_analysis, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::run_undirected_analysis, m)?)?;
    Ok(())
}
