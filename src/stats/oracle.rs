//! The seam between graph logic and the statistical backend.

use super::error::StatError;
use crate::graph::VarId;

/// The result of one conditional-independence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    /// Partial correlation of the tested pair given the controls, in [-1, 1].
    pub r: f64,
    /// Two-sided p-value under the null of zero partial correlation, in [0, 1].
    pub p_value: f64,
}

/// Answers "are `x` and `y` independent given `given`?".
///
/// Implementations must be pure and deterministic for a fixed dataset. `Sync`
/// lets candidate separating sets be tested from several rayon workers.
pub trait IndependenceOracle: Sync {
    fn test(&self, x: VarId, y: VarId, given: &[VarId]) -> Result<TestOutcome, StatError>;
}

impl<O: IndependenceOracle + ?Sized> IndependenceOracle for &O {
    fn test(&self, x: VarId, y: VarId, given: &[VarId]) -> Result<TestOutcome, StatError> {
        (**self).test(x, y, given)
    }
}
