use crate::data::Dataset;
use crate::error::SearchError;
use crate::search::{self, PathRecord};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;

fn to_py_err(e: SearchError) -> PyErr {
    match e {
        SearchError::MissingInput(_) | SearchError::InvalidDataset(_) | SearchError::InvalidConfig(_) => {
            PyValueError::new_err(e.to_string())
        }
        SearchError::UnknownVariable(_) => PyRuntimeError::new_err(e.to_string()),
    }
}

#[pyclass(name = "PathRecord", get_all, frozen)]
#[derive(Debug, Clone)]
pub struct PyPathRecord {
    source: String,
    target: String,
    direction: String,
    strength: f64,
    p_value: f64,
    controls: Vec<String>,
}

#[pymethods]
impl PyPathRecord {
    fn __repr__(&self) -> String {
        format!(
            "PathRecord({} {} {}, strength={:.4}, p_value={:.3e}, controls={:?})",
            self.source, self.direction, self.target, self.strength, self.p_value, self.controls
        )
    }
}

impl From<PathRecord> for PyPathRecord {
    fn from(r: PathRecord) -> Self {
        Self {
            source: r.source,
            target: r.target,
            direction: r.direction.as_str().to_string(),
            strength: r.strength,
            p_value: r.p_value,
            controls: r.controls,
        }
    }
}

/// Column order is irrelevant: variables are ordered by name.
fn dataset(columns: HashMap<String, Vec<f64>>) -> PyResult<Dataset> {
    Dataset::from_columns(columns).map_err(|e| to_py_err(e.into()))
}

/// Directed analysis over `{name: values}` columns.
#[pyfunction]
#[pyo3(signature = (columns, alpha=0.05, max_order=4))]
pub fn run_directed_analysis(columns: HashMap<String, Vec<f64>>, alpha: f64, max_order: usize) -> PyResult<Vec<PyPathRecord>> {
    let records = search::run_directed_analysis(&dataset(columns)?, alpha, max_order).map_err(to_py_err)?;
    Ok(records.into_iter().map(PyPathRecord::from).collect())
}

/// Undirected analysis over `{name: values}` columns; every record is `---`.
#[pyfunction]
#[pyo3(signature = (columns, alpha=0.05, max_order=4))]
pub fn run_undirected_analysis(columns: HashMap<String, Vec<f64>>, alpha: f64, max_order: usize) -> PyResult<Vec<PyPathRecord>> {
    let records = search::run_undirected_analysis(&dataset(columns)?, alpha, max_order).map_err(to_py_err)?;
    Ok(records.into_iter().map(PyPathRecord::from).collect())
}
