//! Frechet distance between Gaussian moment summaries of two embedding
//! samples.
//!
//! `FID = |mu_s - mu_t|^2 + Tr(S_s + S_t - 2 (S_s S_t)^{1/2})`.
//!
//! The product square root is evaluated through the symmetric form
//! `sqrt(S_s) S_t sqrt(S_s)`, whose eigenvalues are real for positive
//! semidefinite inputs. Tiny negative eigenvalues are numerical noise and
//! are clamped to zero; anything below the relative tolerance is an error,
//! never silently discarded.

use nalgebra::DMatrix;

use crate::{
    error::{Error, Result},
    moments,
    sample::Sample,
};

/// Compute the FID between two embedding samples.
///
/// # Errors
///
/// Returns `DegenerateSample` when a sample has fewer than `dim + 1` rows
/// and `NumericalInstability` when an eigenvalue of the (symmetrized)
/// covariance product falls below the negative tolerance.
pub(crate) fn distance(
    source: &Sample,
    target: &Sample,
    reg_eps: f64,
    stability_tol: f64,
) -> Result<f64> {
    let required = source.dim() + 1;
    for sample in [source, target] {
        if sample.rows() < required {
            return Err(Error::degenerate("fid", sample.rows(), required));
        }
    }

    let mu_s = moments::mean(source)?;
    let mu_t = moments::mean(target)?;
    let cov_s = moments::covariance(source, reg_eps)?;
    let cov_t = moments::covariance(target, reg_eps)?;

    let mean_term = (&mu_s - &mu_t).norm_squared();

    let sqrt_s = matrix_sqrt(&cov_s, stability_tol)?;
    let product = &sqrt_s * &cov_t * &sqrt_s;
    let trace_sqrt = trace_of_sqrt(&product, stability_tol)?;

    let fid = mean_term + cov_s.trace() + cov_t.trace() - 2.0 * trace_sqrt;
    Ok(fid.max(0.0))
}

/// Symmetric positive-semidefinite square root via eigendecomposition.
fn matrix_sqrt(matrix: &DMatrix<f64>, tol: f64) -> Result<DMatrix<f64>> {
    let eig = matrix.clone().symmetric_eigen();
    let sqrt_vals = checked_sqrt_eigenvalues(eig.eigenvalues.as_slice(), tol)?;

    let lambda = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(sqrt_vals));
    Ok(&eig.eigenvectors * lambda * eig.eigenvectors.transpose())
}

/// `Tr(M^{1/2})` for a symmetric PSD matrix, up to noise clamping.
fn trace_of_sqrt(matrix: &DMatrix<f64>, tol: f64) -> Result<f64> {
    // The product can pick up a tiny asymmetric component; fold it back
    let symmetrized = (matrix + matrix.transpose()) * 0.5;
    let eig = symmetrized.symmetric_eigen();
    let sqrt_vals = checked_sqrt_eigenvalues(eig.eigenvalues.as_slice(), tol)?;
    Ok(sqrt_vals.iter().sum())
}

/// Square roots of eigenvalues, clamping negatives within tolerance to 0.
fn checked_sqrt_eigenvalues(eigenvalues: &[f64], tol: f64) -> Result<Vec<f64>> {
    let max_abs = eigenvalues.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let floor = -tol * max_abs.max(1.0);

    eigenvalues
        .iter()
        .map(|&v| {
            if v < floor {
                Err(Error::unstable(
                    "fid",
                    format!("eigenvalue {v} below tolerance {floor}"),
                ))
            } else {
                Ok(v.max(0.0).sqrt())
            }
        })
        .collect()
}
