//! Maximum Mean Discrepancy with a Gaussian kernel.
//!
//! Uses the unbiased U-statistic estimator
//! `MMD^2 = E[k(x, x')] + E[k(y, y')] - 2 E[k(x, y)]`
//! with within-sample pairs restricted to distinct indices. The returned
//! value is `sqrt(max(0, MMD^2))`; the clamp removes small negative
//! numerical artifacts the unbiased estimator can produce.

use crate::{
    error::{Error, Result},
    sample::Sample,
};

/// Bandwidth fallback when the median heuristic degenerates to zero.
const FALLBACK_BANDWIDTH: f64 = 1.0;

/// Compute the MMD between two samples.
///
/// `bandwidth` of `None` selects the median pairwise-distance heuristic
/// over the pooled sample.
///
/// # Errors
///
/// Returns `InvalidConfig` if a configured bandwidth is not positive and
/// `DegenerateSample` if either sample has fewer than 2 rows (the unbiased
/// within-sample terms need distinct pairs).
pub(crate) fn distance(source: &Sample, target: &Sample, bandwidth: Option<f64>) -> Result<f64> {
    for sample in [source, target] {
        if sample.rows() < 2 {
            return Err(Error::degenerate("mmd", sample.rows(), 2));
        }
    }

    let sigma = match bandwidth {
        Some(b) if b > 0.0 => b,
        Some(b) => {
            return Err(Error::invalid_config(format!(
                "METHOD.bandwidth must be positive, got {b}"
            )));
        }
        None => median_heuristic(source, target),
    };

    let gamma = 1.0 / (2.0 * sigma * sigma);

    let xx = mean_kernel_within(source, gamma);
    let yy = mean_kernel_within(target, gamma);
    let xy = mean_kernel_between(source, target, gamma);

    let mmd_sq = xx + yy - 2.0 * xy;
    Ok(mmd_sq.max(0.0).sqrt())
}

/// Median of the positive pairwise distances in the pooled sample.
fn median_heuristic(source: &Sample, target: &Sample) -> f64 {
    let mut dists = Vec::new();
    let rows: Vec<&[f64]> = source.iter_rows().chain(target.iter_rows()).collect();

    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let d = euclidean(rows[i], rows[j]);
            if d > 0.0 {
                dists.push(d);
            }
        }
    }

    if dists.is_empty() {
        return FALLBACK_BANDWIDTH;
    }

    dists.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    dists[dists.len() / 2]
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn gaussian(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let sq: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    (-gamma * sq).exp()
}

/// Mean kernel value over distinct within-sample pairs.
#[allow(clippy::cast_precision_loss)]
fn mean_kernel_within(sample: &Sample, gamma: f64) -> f64 {
    let n = sample.rows();
    let mut acc = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                acc += gaussian(sample.row(i), sample.row(j), gamma);
            }
        }
    }
    acc / (n * (n - 1)) as f64
}

/// Mean kernel value over all cross-sample pairs.
#[allow(clippy::cast_precision_loss)]
fn mean_kernel_between(source: &Sample, target: &Sample, gamma: f64) -> f64 {
    let mut acc = 0.0;
    for x in source.iter_rows() {
        for y in target.iter_rows() {
            acc += gaussian(x, y, gamma);
        }
    }
    acc / (source.rows() * target.rows()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace_sample(start: f64, n: usize) -> Sample {
        #[allow(clippy::cast_precision_loss)]
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![start + i as f64 * 0.1, start - i as f64 * 0.05])
            .collect();
        Sample::from_rows(&rows).expect("sample")
    }

    #[test]
    fn test_self_distance_near_zero() {
        let s = linspace_sample(0.0, 50);
        let d = distance(&s, &s, None).expect("mmd");
        assert!(d < 1e-6, "self distance was {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = linspace_sample(0.0, 40);
        let b = linspace_sample(3.0, 30);
        let ab = distance(&a, &b, Some(1.0)).expect("mmd");
        let ba = distance(&b, &a, Some(1.0)).expect("mmd");
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_shifted_distribution_positive() {
        let a = linspace_sample(0.0, 40);
        let b = linspace_sample(10.0, 40);
        let d = distance(&a, &b, None).expect("mmd");
        assert!(d > 0.1, "shifted samples should be far apart, got {d}");
    }

    #[test]
    fn test_closer_distribution_smaller_distance() {
        let a = linspace_sample(0.0, 40);
        let near = linspace_sample(0.5, 40);
        let far = linspace_sample(10.0, 40);
        let d_near = distance(&a, &near, Some(1.0)).expect("mmd");
        let d_far = distance(&a, &far, Some(1.0)).expect("mmd");
        assert!(d_far > d_near);
    }

    #[test]
    fn test_rejects_nonpositive_bandwidth() {
        let s = linspace_sample(0.0, 10);
        assert!(matches!(
            distance(&s, &s, Some(0.0)),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(distance(&s, &s, Some(-1.0)).is_err());
    }

    #[test]
    fn test_rejects_single_row_sample() {
        let s = linspace_sample(0.0, 10);
        let tiny = Sample::from_rows(&[vec![1.0, 2.0]]).expect("sample");
        assert!(matches!(
            distance(&tiny, &s, None),
            Err(Error::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_constant_identical_samples_use_fallback_bandwidth() {
        // All pairwise distances are zero, so the heuristic has no median;
        // the distance must still evaluate cleanly to zero.
        let a = Sample::from_rows(&[vec![3.0], vec![3.0], vec![3.0]]).expect("sample");
        let d = distance(&a, &a, None).expect("mmd");
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn test_nonnegative() {
        let a = linspace_sample(0.0, 25);
        let b = linspace_sample(0.01, 25);
        assert!(distance(&a, &b, None).expect("mmd") >= 0.0);
    }
}
