//! Defines the error types for independence testing.
use thiserror::Error;

/// Why an independence test could not produce a result.
///
/// None of these is evidence of independence: callers treat every variant as an
/// inconclusive test.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatError {
    /// The covariance among the tested variables and controls is not invertible
    /// (collinear controls, constant columns).
    #[error("Singular covariance among {size} variables")]
    SingularCovariance { size: usize },
    /// Not enough observations for the requested conditioning order.
    #[error("Insufficient data: {rows} rows, more than {required} required")]
    InsufficientData { rows: usize, required: usize },
    /// Any other numeric failure (non-finite statistic, invalid distribution).
    #[error("Unexpected computation failure: {0}")]
    Numeric(String),
}

impl StatError {
    /// Failures that go away when the control set is dropped.
    pub fn is_control_related(&self) -> bool {
        matches!(self, StatError::SingularCovariance { .. } | StatError::InsufficientData { .. })
    }
}
