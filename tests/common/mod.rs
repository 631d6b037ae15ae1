//! Synthetic linear-Gaussian data with exactly orthogonal noise.
//!
//! Noise columns are centered and Gram-Schmidt orthogonalized in-sample, so the
//! sample covariance of the generated variables equals the population
//! covariance of the model. Implied conditional independences then hold to
//! machine precision and every scenario is deterministic for a fixed seed.
#![allow(dead_code)]

use causal_search_core::Dataset;
use std::f64::consts::PI;

fn gaussian(rng: &mut fastrand::Rng) -> f64 {
    let u1 = rng.f64().max(f64::MIN_POSITIVE);
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `count` centered, mutually orthogonal columns of `rows` values, each with
/// unit sample variance.
pub fn orthogonal_noise(count: usize, rows: usize, seed: u64) -> Vec<Vec<f64>> {
    assert!(count < rows, "need more rows than noise columns");
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(count);

    while basis.len() < count {
        let mut v: Vec<f64> = (0..rows).map(|_| gaussian(&mut rng)).collect();
        let mean = v.iter().sum::<f64>() / rows as f64;
        v.iter_mut().for_each(|x| *x -= mean);
        // Two sweeps keep the residual projections at rounding level.
        for _ in 0..2 {
            for b in &basis {
                let proj = dot(&v, b) / dot(b, b);
                v.iter_mut().zip(b).for_each(|(x, y)| *x -= proj * y);
            }
        }
        let norm = dot(&v, &v).sqrt();
        if norm < 1e-8 {
            continue;
        }
        let scale = (rows as f64).sqrt() / norm;
        v.iter_mut().for_each(|x| *x *= scale);
        basis.push(v);
    }
    basis
}

/// Builds a dataset from a linear structural model with unit coefficients.
///
/// `model` lists each variable after its parents: `("z", &["x", "y"])`
/// means `z = x + y + noise_z`.
pub fn linear_sem(model: &[(&str, &[&str])], rows: usize, seed: u64) -> Dataset {
    let noise = orthogonal_noise(model.len(), rows, seed);
    let mut columns: Vec<(String, Vec<f64>)> = Vec::with_capacity(model.len());

    for ((name, parents), eps) in model.iter().zip(noise) {
        let mut values = eps;
        for parent in parents.iter() {
            let (_, col) = columns
                .iter()
                .find(|(n, _)| n == parent)
                .unwrap_or_else(|| panic!("parent {parent} must be listed before {name}"));
            values.iter_mut().zip(col).for_each(|(v, p)| *v += p);
        }
        columns.push((name.to_string(), values));
    }
    Dataset::from_columns(columns).expect("generated dataset is well formed")
}

pub fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
}
