//! Gaussian partial-correlation test backed by a precomputed covariance matrix.
//!
//! The sample covariance of every variable is computed once. Each test picks
//! the principal submatrix of `{x, y} ∪ S`, factorizes it with Cholesky and reads
//! the partial correlation off the precision matrix:
//!
//! `r = -P[x,y] / sqrt(P[x,x] * P[y,y])`
//!
//! The p-value is two-sided under Student's t with `n - |S| - 2` degrees of freedom.

use super::error::StatError;
use super::oracle::{IndependenceOracle, TestOutcome};
use crate::data::Dataset;
use crate::graph::VarId;
use nalgebra::DMatrix;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Squared Cholesky pivots below this fraction of the variable's variance mean
/// the variable is (numerically) a linear combination of the ones before it.
const SINGULAR_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct PartialCorrelationTest {
    covariance: DMatrix<f64>,
    rows: usize,
}

impl PartialCorrelationTest {
    pub fn new(dataset: &Dataset) -> Self {
        let p = dataset.n_vars();
        let n = dataset.n_rows();

        let centered: Vec<Vec<f64>> = dataset
            .var_ids()
            .map(|id| {
                let col = dataset.column(id);
                let mean = col.iter().sum::<f64>() / n as f64;
                col.iter().map(|x| x - mean).collect()
            })
            .collect();

        let denom = (n.max(2) - 1) as f64;
        let mut covariance = DMatrix::zeros(p, p);
        for i in 0..p {
            for j in i..p {
                let c = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum::<f64>() / denom;
                covariance[(i, j)] = c;
                covariance[(j, i)] = c;
            }
        }

        Self { covariance, rows: n }
    }

    pub fn rows(&self) -> usize { self.rows }

    fn partial_correlation(&self, vars: &[VarId]) -> Result<f64, StatError> {
        let m = vars.len();
        let sub = DMatrix::from_fn(m, m, |i, j| self.covariance[(vars[i].index(), vars[j].index())]);

        let chol = sub.clone().cholesky().ok_or(StatError::SingularCovariance { size: m })?;
        let l = chol.l();
        for j in 0..m {
            let variance = sub[(j, j)];
            if variance <= 0.0 || l[(j, j)] * l[(j, j)] <= SINGULAR_TOLERANCE * variance {
                return Err(StatError::SingularCovariance { size: m });
            }
        }

        let precision = chol.inverse();
        let denom = (precision[(0, 0)] * precision[(1, 1)]).sqrt();
        let r = -precision[(0, 1)] / denom;
        if !r.is_finite() {
            return Err(StatError::Numeric(format!("partial correlation is {}", r)));
        }
        Ok(r.clamp(-1.0, 1.0))
    }
}

/// Two-sided p-value of a (partial) correlation `r` with `dof` degrees of freedom.
pub fn correlation_p_value(r: f64, dof: f64) -> Result<f64, StatError> {
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    let t = r * (dof / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, dof).map_err(|e| StatError::Numeric(e.to_string()))?;
    let p = 2.0 * dist.sf(t.abs());
    if !p.is_finite() {
        return Err(StatError::Numeric(format!("p-value is {} for t = {}", p, t)));
    }
    Ok(p.clamp(0.0, 1.0))
}

impl IndependenceOracle for PartialCorrelationTest {
    fn test(&self, x: VarId, y: VarId, given: &[VarId]) -> Result<TestOutcome, StatError> {
        let k = given.len();
        if self.rows <= k + 2 {
            return Err(StatError::InsufficientData { rows: self.rows, required: k + 2 });
        }

        let mut vars = Vec::with_capacity(k + 2);
        vars.push(x);
        vars.push(y);
        vars.extend(given.iter().copied().filter(|&z| z != x && z != y));

        let r = self.partial_correlation(&vars)?;
        let dof = (self.rows - (vars.len() - 2) - 2) as f64;
        let p_value = correlation_p_value(r, dof)?;
        Ok(TestOutcome { r, p_value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dataset(cols: Vec<(&str, Vec<f64>)>) -> Dataset {
        Dataset::from_columns(cols).unwrap()
    }

    #[test]
    fn test_pearson_matches_closed_form() {
        // r = 0.8 exactly for these vectors.
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 1.0, 4.0, 3.0, 5.0];
        let oracle = PartialCorrelationTest::new(&dataset(vec![("x", x), ("y", y)]));
        let out = oracle.test(VarId(0), VarId(1), &[]).unwrap();
        assert!((out.r - 0.8).abs() < 1e-12, "r = {}", out.r);
        // t = 0.8 * sqrt(3 / 0.36) = 2.3094, two-sided p with 3 dof = 0.1041
        assert!((out.p_value - 0.1041).abs() < 1e-3, "p = {}", out.p_value);
    }

    #[test]
    fn test_partial_correlation_removes_common_cause() {
        // x = z + a, y = z + b with b orthogonal to both a and z, so the residual
        // of y given z is b itself and the partial correlation vanishes.
        let z = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let a = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let b = vec![1.0, 1.0, -2.0, -2.0, 1.0, 1.0];
        let x: Vec<f64> = z.iter().zip(&a).map(|(z, a)| z + a).collect();
        let y: Vec<f64> = z.iter().zip(&b).map(|(z, b)| z + b).collect();
        let ds = dataset(vec![("x", x), ("y", y), ("z", z)]);
        let oracle = PartialCorrelationTest::new(&ds);

        let marginal = oracle.test(VarId(0), VarId(1), &[]).unwrap();
        assert!(marginal.r > 0.5);

        let conditional = oracle.test(VarId(0), VarId(1), &[VarId(2)]).unwrap();
        assert!(conditional.r.abs() < 1e-9, "r = {}", conditional.r);
        assert!(conditional.p_value > 0.99);
    }

    #[test]
    fn test_collinear_controls_are_singular() {
        let x = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let y = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let z = vec![0.5, 0.1, 0.9, 0.4, 0.3, 0.8];
        let z2: Vec<f64> = z.iter().map(|v| 2.0 * v + 1.0).collect();
        let ds = dataset(vec![("x", x), ("y", y), ("z", z), ("z2", z2)]);
        let oracle = PartialCorrelationTest::new(&ds);
        let err = oracle.test(VarId(0), VarId(1), &[VarId(2), VarId(3)]).unwrap_err();
        assert_eq!(err, StatError::SingularCovariance { size: 4 });
    }

    #[test]
    fn test_constant_column_is_singular() {
        let ds = dataset(vec![("x", vec![1.0, 2.0, 3.0, 4.0]), ("y", vec![7.0; 4])]);
        let oracle = PartialCorrelationTest::new(&ds);
        assert!(matches!(oracle.test(VarId(0), VarId(1), &[]), Err(StatError::SingularCovariance { .. })));
    }

    #[rstest]
    #[case(2, 0)]
    #[case(4, 2)]
    fn test_insufficient_rows(#[case] rows: usize, #[case] order: usize) {
        let cols: Vec<(String, Vec<f64>)> = (0..4)
            .map(|i| (format!("v{}", i), (0..rows).map(|r| ((r * 7 + i * 3) % 5) as f64).collect()))
            .collect();
        let oracle = PartialCorrelationTest::new(&Dataset::from_columns(cols).unwrap());
        let given: Vec<VarId> = (2..2 + order).map(VarId::new).collect();
        assert_eq!(
            oracle.test(VarId(0), VarId(1), &given).unwrap_err(),
            StatError::InsufficientData { rows, required: order + 2 }
        );
    }

    #[test]
    fn test_perfect_correlation_has_zero_p_value() {
        assert_eq!(correlation_p_value(1.0, 10.0).unwrap(), 0.0);
        assert!((correlation_p_value(0.0, 10.0).unwrap() - 1.0).abs() < 1e-12);
    }
}
