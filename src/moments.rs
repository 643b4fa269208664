//! Moment estimation over feature samples.
//!
//! Means, regularized covariance matrices, and per-dimension central
//! moments, shared by the moment-based distance estimators.

// Statistical computation requires usize->f64 casts
#![allow(clippy::cast_precision_loss)]

use nalgebra::{DMatrix, DVector};

use crate::{
    error::{Error, Result},
    sample::Sample,
};

/// Default multiple of the identity added to covariance matrices before
/// inversion/determinant work.
pub const DEFAULT_REG_EPS: f64 = 1e-6;

/// Sample mean vector.
///
/// # Errors
/// Returns `DegenerateSample` if the sample is empty.
pub fn mean(sample: &Sample) -> Result<DVector<f64>> {
    if sample.is_empty() {
        return Err(Error::degenerate("mean", 0, 1));
    }

    let n = sample.rows() as f64;
    let mut acc = DVector::zeros(sample.dim());
    for row in sample.iter_rows() {
        for (j, v) in row.iter().enumerate() {
            acc[j] += v;
        }
    }
    acc /= n;
    Ok(acc)
}

/// Unbiased sample covariance, regularized with `reg_eps` times the identity.
///
/// The regularization keeps the matrix invertible when the sample size is
/// close to or below the dimensionality, or when features are collinear.
///
/// # Errors
/// Returns `DegenerateSample` if the sample has fewer than 2 rows, or
/// `InvalidConfig` if `reg_eps` is negative.
pub fn covariance(sample: &Sample, reg_eps: f64) -> Result<DMatrix<f64>> {
    if sample.rows() < 2 {
        return Err(Error::degenerate("covariance", sample.rows(), 2));
    }
    if reg_eps < 0.0 {
        return Err(Error::invalid_config(format!(
            "METHOD.reg_eps must be nonnegative, got {reg_eps}"
        )));
    }

    let d = sample.dim();
    let mu = mean(sample)?;
    let mut cov = DMatrix::zeros(d, d);

    for row in sample.iter_rows() {
        for i in 0..d {
            let di = row[i] - mu[i];
            for j in i..d {
                cov[(i, j)] += di * (row[j] - mu[j]);
            }
        }
    }

    let denom = (sample.rows() - 1) as f64;
    for i in 0..d {
        for j in i..d {
            let v = cov[(i, j)] / denom;
            cov[(i, j)] = v;
            cov[(j, i)] = v;
        }
        cov[(i, i)] += reg_eps;
    }

    Ok(cov)
}

/// Per-dimension central moment of the given order.
///
/// Order 1 is zero by construction; order 2 is the biased variance.
///
/// # Errors
/// Returns `DegenerateSample` if the sample is empty, or `InvalidConfig` if
/// `order` is zero.
pub fn central_moment(sample: &Sample, order: u32) -> Result<DVector<f64>> {
    if order == 0 {
        return Err(Error::invalid_config("central moment order must be >= 1"));
    }
    if sample.is_empty() {
        return Err(Error::degenerate("central_moment", 0, 1));
    }

    let n = sample.rows() as f64;
    let mu = mean(sample)?;
    let mut acc = DVector::zeros(sample.dim());

    for row in sample.iter_rows() {
        for (j, v) in row.iter().enumerate() {
            acc[j] += (v - mu[j]).powi(order as i32);
        }
    }
    acc /= n;
    Ok(acc)
}
