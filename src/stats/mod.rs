//! Conditional-independence testing.
//!
//! Graph logic only ever sees the `IndependenceOracle` trait: data in,
//! `(r, p)` out. `PartialCorrelationTest` is the Gaussian backend used by the
//! pipeline; tests substitute scripted oracles.

pub use self::error::StatError;
pub use self::oracle::{IndependenceOracle, TestOutcome};
pub use self::partial_corr::{correlation_p_value, PartialCorrelationTest};

mod error;
mod oracle;
mod partial_corr;
