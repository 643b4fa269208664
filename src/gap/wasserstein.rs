//! Wasserstein distances: exact 1-D optimal transport and the sliced
//! approximation for higher dimensions.
//!
//! The 1-D cost is the mean absolute difference between order statistics
//! after the shorter sample is brought to the longer sample's length by
//! linear quantile interpolation. The sliced variant averages the 1-D cost
//! over random unit-vector projections.

// Statistical computation requires usize->f64 casts
#![allow(clippy::cast_precision_loss)]

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{
    error::{Error, Result},
    sample::Sample,
};

/// Sliced-Wasserstein result: the aggregated mean plus the per-projection
/// distances retained for inspection.
#[derive(Debug, Clone)]
pub struct SlicedDistance {
    /// Mean 1-D transport cost over all projections.
    pub mean: f64,
    /// Individual 1-D transport cost per projection.
    pub per_projection: Vec<f64>,
}

/// Compute the exact 1-D Wasserstein distance.
///
/// # Errors
///
/// Returns `InvalidConfig` if the samples are not one-dimensional and
/// `DegenerateSample` if either sample is empty.
pub(crate) fn distance_1d(source: &Sample, target: &Sample) -> Result<f64> {
    if source.dim() != 1 {
        return Err(Error::invalid_config(format!(
            "wasserstein 1D expects a single declared feature, got {} dimensions",
            source.dim()
        )));
    }
    for sample in [source, target] {
        if sample.is_empty() {
            return Err(Error::degenerate("wasserstein", 0, 1));
        }
    }

    let mut xs = source.column(0);
    let mut ys = target.column(0);
    sort_unstable(&mut xs);
    sort_unstable(&mut ys);
    Ok(transport_cost(&xs, &ys))
}

/// Compute the sliced Wasserstein distance over random projections.
///
/// # Errors
///
/// Returns `InvalidConfig` if `num_projections < 1` and `DegenerateSample`
/// if either sample is empty.
pub(crate) fn sliced(
    source: &Sample,
    target: &Sample,
    num_projections: usize,
    seed: Option<u64>,
) -> Result<SlicedDistance> {
    if num_projections < 1 {
        return Err(Error::invalid_config(
            "METHOD.num_projections must be >= 1",
        ));
    }
    for sample in [source, target] {
        if sample.is_empty() {
            return Err(Error::degenerate("wasserstein", 0, 1));
        }
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let dim = source.dim();
    let mut per_projection = Vec::with_capacity(num_projections);

    for _ in 0..num_projections {
        let direction = random_unit_vector(&mut rng, dim);

        let mut xs: Vec<f64> = source.iter_rows().map(|r| dot(r, &direction)).collect();
        let mut ys: Vec<f64> = target.iter_rows().map(|r| dot(r, &direction)).collect();
        sort_unstable(&mut xs);
        sort_unstable(&mut ys);

        per_projection.push(transport_cost(&xs, &ys));
    }

    let mean = per_projection.iter().sum::<f64>() / num_projections as f64;
    Ok(SlicedDistance {
        mean,
        per_projection,
    })
}

/// Gaussian draw normalized to unit length. Redraws on the (measure-zero)
/// chance of a near-zero vector.
fn random_unit_vector(rng: &mut StdRng, dim: usize) -> Vec<f64> {
    loop {
        let v: Vec<f64> = (0..dim).map(|_| rng.sample(StandardNormal)).collect();
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 1e-12 {
            return v.into_iter().map(|x| x / norm).collect();
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn sort_unstable(values: &mut [f64]) {
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Mean absolute difference of order statistics, lengths equalized by
/// quantile interpolation. Both inputs must be sorted and non-empty.
fn transport_cost(xs: &[f64], ys: &[f64]) -> f64 {
    let m = xs.len().max(ys.len());
    let xq = equalize(xs, m);
    let yq = equalize(ys, m);

    xq.iter()
        .zip(yq.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / m as f64
}

/// Linearly interpolate a sorted sample's quantile function at `m` evenly
/// spaced positions.
fn equalize(sorted: &[f64], m: usize) -> Vec<f64> {
    let n = sorted.len();
    if n == m {
        return sorted.to_vec();
    }
    (0..m)
        .map(|i| {
            let pos = if m == 1 {
                0.0
            } else {
                i as f64 * (n - 1) as f64 / (m - 1) as f64
            };
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] * (1.0 - frac) + sorted[hi] * frac
        })
        .collect()
}
