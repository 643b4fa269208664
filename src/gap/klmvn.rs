//! KL divergence under a multivariate-normal assumption.
//!
//! Both samples are summarized by their mean and regularized covariance,
//! and the closed form
//! `KL(N_s || N_t) = 1/2 (Tr(S_t^-1 S_s) + (mu_t - mu_s)^T S_t^-1
//! (mu_t - mu_s) - d + ln det S_t - ln det S_s)`
//! is evaluated through Cholesky factorizations; no explicit inverse is
//! ever formed. Note the divergence is directed: swapping source and
//! target changes the result unless the moments coincide.

use nalgebra::{Cholesky, Dyn};

use crate::{
    error::{Error, Result},
    moments,
    sample::Sample,
};

/// Compute `KL(source || target)` under Gaussian assumptions.
///
/// # Errors
///
/// Returns `DegenerateSample` when a sample has fewer than `dim + 1` rows
/// and `SingularCovariance` when either covariance has no Cholesky factor
/// after regularization.
pub(crate) fn distance(source: &Sample, target: &Sample, reg_eps: f64) -> Result<f64> {
    let required = source.dim() + 1;
    for sample in [source, target] {
        if sample.rows() < required {
            return Err(Error::degenerate("klmvn", sample.rows(), required));
        }
    }

    let mu_s = moments::mean(source)?;
    let mu_t = moments::mean(target)?;
    let cov_s = moments::covariance(source, reg_eps)?;
    let cov_t = moments::covariance(target, reg_eps)?;

    let chol_t = Cholesky::new(cov_t).ok_or_else(|| {
        Error::singular(
            "klmvn",
            "target covariance has no Cholesky factor after regularization",
        )
    })?;
    let chol_s = Cholesky::new(cov_s.clone()).ok_or_else(|| {
        Error::singular(
            "klmvn",
            "source covariance has no Cholesky factor after regularization",
        )
    })?;

    #[allow(clippy::cast_precision_loss)]
    let d = source.dim() as f64;

    let trace_term = chol_t.solve(&cov_s).trace();

    let diff = mu_t - mu_s;
    let quad_term = diff.dot(&chol_t.solve(&diff));

    let ln_det_t = ln_det(&chol_t);
    let ln_det_s = ln_det(&chol_s);

    let kl = 0.5 * (trace_term + quad_term - d + ln_det_t - ln_det_s);
    // The closed form is nonnegative; only regularization noise can dip below
    Ok(kl.max(0.0))
}

/// Log-determinant from the Cholesky factor diagonal.
fn ln_det(chol: &Cholesky<f64, Dyn>) -> f64 {
    2.0 * chol.l_dirty().diagonal().iter().map(|v| v.ln()).sum::<f64>()
}
