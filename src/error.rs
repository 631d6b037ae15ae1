//! Fatal errors surfaced by a search run.
use crate::config::ConfigError;
use crate::data::DatasetError;
use thiserror::Error;

/// Errors that abort a run before or outside the statistical phases.
///
/// Per-test and per-edge failures never show up here: they degrade locally and
/// are reported through the trace and `StrengthReport::skipped`.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No dataset supplied: {0}")]
    MissingInput(String),
    #[error("Invalid dataset: {0}")]
    InvalidDataset(DatasetError),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
}

impl From<DatasetError> for SearchError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NoVariables | DatasetError::NoRows => SearchError::MissingInput(err.to_string()),
            other => SearchError::InvalidDataset(other),
        }
    }
}
