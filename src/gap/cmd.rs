//! Central Moment Discrepancy.
//!
//! Both samples are rescaled per dimension to [0, 1] using the min/max of
//! the union, so every moment term is bounded and the orders are
//! comparable. The distance is the Euclidean distance between the rescaled
//! means plus a geometrically decaying sum of distances between central
//! moments of order 2..=k.

use crate::{
    error::{Error, Result},
    moments,
    sample::Sample,
};

/// Weight decay applied per additional moment order.
const WEIGHT_DECAY: f64 = 0.5;

/// Compute the CMD between two samples.
///
/// # Errors
///
/// Returns `InvalidConfig` if `order < 1` and `DegenerateSample` if either
/// sample has fewer than 2 rows.
pub(crate) fn distance(source: &Sample, target: &Sample, order: u32) -> Result<f64> {
    if order < 1 {
        return Err(Error::invalid_config(format!(
            "METHOD.k must be >= 1, got {order}"
        )));
    }
    for sample in [source, target] {
        if sample.rows() < 2 {
            return Err(Error::degenerate("cmd", sample.rows(), 2));
        }
    }

    let (lo, hi) = union_bounds(source, target);
    let src = rescale(source, &lo, &hi)?;
    let tgt = rescale(target, &lo, &hi)?;

    let mu_s = moments::mean(&src)?;
    let mu_t = moments::mean(&tgt)?;
    let mut dist = (mu_s - mu_t).norm();

    let mut weight = WEIGHT_DECAY;
    for j in 2..=order {
        let c_s = moments::central_moment(&src, j)?;
        let c_t = moments::central_moment(&tgt, j)?;
        dist += weight * (c_s - c_t).norm();
        weight *= WEIGHT_DECAY;
    }

    Ok(dist)
}

/// Per-dimension min/max over the union of both samples.
fn union_bounds(source: &Sample, target: &Sample) -> (Vec<f64>, Vec<f64>) {
    let d = source.dim();
    let mut lo = vec![f64::INFINITY; d];
    let mut hi = vec![f64::NEG_INFINITY; d];

    for sample in [source, target] {
        for row in sample.iter_rows() {
            for j in 0..d {
                lo[j] = lo[j].min(row[j]);
                hi[j] = hi[j].max(row[j]);
            }
        }
    }
    (lo, hi)
}

/// Rescale each dimension to [0, 1]; constant dimensions map to 0.
fn rescale(sample: &Sample, lo: &[f64], hi: &[f64]) -> Result<Sample> {
    let d = sample.dim();
    let data: Vec<f64> = sample
        .as_slice()
        .iter()
        .enumerate()
        .map(|(idx, &v)| {
            let j = idx % d;
            let range = hi[j] - lo[j];
            if range > f64::EPSILON {
                (v - lo[j]) / range
            } else {
                0.0
            }
        })
        .collect();

    Sample::from_vec(data, sample.rows(), d)
}
