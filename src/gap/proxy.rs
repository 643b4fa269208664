//! Proxy-A-Distance: domain-classifier-based distance proxy.
//!
//! A binary classifier is trained to tell source rows (label -1) from
//! target rows (label +1) on a train split, its generalization error `eps`
//! is measured on the held-out validation split, and the distance is
//! `2 * (1 - 2 * eps)` clamped to `[0, 2]`. The classifier lives and dies
//! inside a single call; nothing is cached across calls.

// Statistical computation requires usize->f64 casts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    config::ClassifierKind,
    error::{Error, Result},
    sample::Sample,
};

/// Ridge penalty for the linear probe.
const RIDGE_LAMBDA: f64 = 1e-3;

/// Compute the Proxy-A-Distance between two samples.
///
/// # Errors
///
/// Returns `InsufficientData` if either domain cannot yield at least one
/// train and one validation row, and `NumericalInstability` if the linear
/// probe cannot be solved.
pub(crate) fn distance(
    source: &Sample,
    target: &Sample,
    classifier: ClassifierKind,
    train_ratio: f64,
    seed: Option<u64>,
) -> Result<f64> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let (src_train, src_val) = split_domain(source, "source", train_ratio, &mut rng)?;
    let (tgt_train, tgt_val) = split_domain(target, "target", train_ratio, &mut rng)?;

    let dim = source.dim();
    let mut train_rows: Vec<&[f64]> = Vec::with_capacity(src_train.len() + tgt_train.len());
    let mut train_labels: Vec<f64> = Vec::with_capacity(train_rows.capacity());

    for &i in &src_train {
        train_rows.push(source.row(i));
        train_labels.push(-1.0);
    }
    for &i in &tgt_train {
        train_rows.push(target.row(i));
        train_labels.push(1.0);
    }

    let val_rows: Vec<(&[f64], f64)> = src_val
        .iter()
        .map(|&i| (source.row(i), -1.0))
        .chain(tgt_val.iter().map(|&i| (target.row(i), 1.0)))
        .collect();

    let mistakes = match classifier {
        ClassifierKind::Linear => {
            let probe = LinearProbe::fit(&train_rows, &train_labels, dim)?;
            val_rows
                .iter()
                .filter(|(row, label)| probe.predict(row) != *label)
                .count()
        }
        ClassifierKind::NearestNeighbor => val_rows
            .iter()
            .filter(|(row, label)| nearest_label(&train_rows, &train_labels, row) != *label)
            .count(),
    };

    let eps = mistakes as f64 / val_rows.len() as f64;
    Ok((2.0 * (1.0 - 2.0 * eps)).clamp(0.0, 2.0))
}

/// Shuffle one domain's row indices and split them train/validation.
fn split_domain(
    sample: &Sample,
    domain: &str,
    train_ratio: f64,
    rng: &mut StdRng,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n = sample.rows();
    let n_train = ((n as f64) * train_ratio).floor() as usize;

    if n_train < 1 || n - n_train < 1 {
        return Err(Error::insufficient(
            "proxy",
            format!(
                "{domain} domain has {n} rows, cannot produce both a train \
                 and a validation split at ratio {train_ratio}"
            ),
        ));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let val = indices.split_off(n_train);
    Ok((indices, val))
}

/// Ridge-regularized linear probe on +/-1 labels, with an intercept term.
struct LinearProbe {
    weights: DVector<f64>,
}

impl LinearProbe {
    fn fit(rows: &[&[f64]], labels: &[f64], dim: usize) -> Result<Self> {
        let n = rows.len();
        let cols = dim + 1;

        let mut design = DMatrix::zeros(n, cols);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                design[(i, j)] = v;
            }
            design[(i, dim)] = 1.0;
        }
        let y = DVector::from_column_slice(labels);

        let mut normal = design.transpose() * &design;
        for j in 0..cols {
            normal[(j, j)] += RIDGE_LAMBDA;
        }
        let rhs = design.transpose() * y;

        let qr = normal.clone().qr();
        let weights = match qr.solve(&rhs) {
            Some(w) => w,
            None => normal
                .pseudo_inverse(f64::EPSILON * 100.0)
                .map(|inv| inv * rhs)
                .map_err(|_| {
                    Error::unstable("proxy", "linear probe normal equations are unsolvable")
                })?,
        };

        Ok(Self { weights })
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let dim = self.weights.len() - 1;
        let mut score = self.weights[dim];
        for (j, &v) in row.iter().enumerate() {
            score += self.weights[j] * v;
        }
        if score >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Label of the nearest train row by Euclidean distance.
fn nearest_label(rows: &[&[f64]], labels: &[f64], query: &[f64]) -> f64 {
    let mut best = f64::INFINITY;
    let mut label = labels[0];
    for (row, &l) in rows.iter().zip(labels.iter()) {
        let d: f64 = row
            .iter()
            .zip(query.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        if d < best {
            best = d;
            label = l;
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(center: (f64, f64), n: usize) -> Sample {
        // Deterministic jitter around the center
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let t = i as f64 * 0.37;
                vec![center.0 + t.sin() * 0.5, center.1 + t.cos() * 0.5]
            })
            .collect();
        Sample::from_rows(&rows).expect("sample")
    }

    #[test]
    fn test_separated_domains_near_two() {
        let source = cluster((0.0, 0.0), 60);
        let target = cluster((10.0, 10.0), 60);
        let d = distance(&source, &target, ClassifierKind::Linear, 0.7, Some(42)).expect("pad");
        assert!(d > 1.5, "separable domains should give a high PAD, got {d}");
        assert!(d <= 2.0);
    }

    #[test]
    fn test_identical_domains_near_zero() {
        let source = cluster((0.0, 0.0), 60);
        let target = cluster((0.0, 0.0), 60);
        let d = distance(&source, &target, ClassifierKind::Linear, 0.7, Some(42)).expect("pad");
        assert!(d < 0.6, "indistinguishable domains should give a low PAD, got {d}");
    }

    #[test]
    fn test_knn_classifier_on_separated_domains() {
        let source = cluster((0.0, 0.0), 40);
        let target = cluster((8.0, -8.0), 40);
        let d = distance(
            &source,
            &target,
            ClassifierKind::NearestNeighbor,
            0.7,
            Some(7),
        )
        .expect("pad");
        assert!(d > 1.5, "1-NN should separate the clusters, got {d}");
    }

    #[test]
    fn test_result_in_range() {
        for seed in 0..5 {
            let source = cluster((0.0, 0.0), 20);
            let target = cluster((1.0, 0.5), 25);
            let d = distance(&source, &target, ClassifierKind::Linear, 0.5, Some(seed))
                .expect("pad");
            assert!((0.0..=2.0).contains(&d), "PAD {d} out of range");
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let source = cluster((0.0, 0.0), 30);
        let target = cluster((2.0, 2.0), 30);
        let a = distance(&source, &target, ClassifierKind::Linear, 0.7, Some(5)).expect("pad");
        let b = distance(&source, &target, ClassifierKind::Linear, 0.7, Some(5)).expect("pad");
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn test_too_small_domain_fails() {
        let source = cluster((0.0, 0.0), 1);
        let target = cluster((5.0, 5.0), 30);
        let err = distance(&source, &target, ClassifierKind::Linear, 0.7, Some(1)).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
        assert!(err.to_string().contains("source"));
    }

    #[test]
    fn test_validation_split_never_empty() {
        // 10 rows at ratio 0.9 leaves exactly one validation row
        let source = cluster((0.0, 0.0), 10);
        let target = cluster((9.0, 9.0), 10);
        let d = distance(&source, &target, ClassifierKind::Linear, 0.9, Some(3)).expect("pad");
        assert!((0.0..=2.0).contains(&d));
    }
}
