//! Feature samples consumed by the distance estimators.
//!
//! A [`Sample`] is an ordered collection of real-valued vectors of fixed
//! dimensionality, stored in a contiguous row-major buffer. A [`DomainPair`]
//! binds a source and a target sample of identical dimensionality.
//!
//! Samples are owned by the caller and never mutated by estimators.

use crate::error::{Error, Result};

/// A finite collection of fixed-dimensional numeric vectors representing one
/// domain's data.
///
/// Data is stored in row-major (C-style) order: row `i` occupies
/// `data[i * dim .. (i + 1) * dim]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The underlying data buffer, row-major.
    data: Vec<f64>,
    /// Number of rows (observations).
    rows: usize,
    /// Number of features per row.
    dim: usize,
}

impl Sample {
    /// Create a sample from a flat row-major buffer.
    ///
    /// # Errors
    /// Returns `FeatureExtraction` if the buffer length does not equal
    /// `rows * dim` or if `dim` is zero.
    pub fn from_vec(data: Vec<f64>, rows: usize, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::extraction("sample dimensionality must be positive"));
        }
        if data.len() != rows * dim {
            return Err(Error::extraction(format!(
                "buffer of length {} does not match {} rows x {} features",
                data.len(),
                rows,
                dim
            )));
        }
        Ok(Self { data, rows, dim })
    }

    /// Create a sample from per-row vectors.
    ///
    /// # Errors
    /// Returns `FeatureExtraction` if the rows are empty or ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::extraction("cannot build a sample from zero rows"));
        };
        let dim = first.len();
        if dim == 0 {
            return Err(Error::extraction("sample dimensionality must be positive"));
        }
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(Error::extraction(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            dim,
        })
    }

    /// Create a one-dimensional sample from a slice of scalars.
    ///
    /// # Errors
    /// Returns `FeatureExtraction` if `values` is empty.
    pub fn from_scalars(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::extraction("cannot build a sample from zero rows"));
        }
        Ok(Self {
            data: values.to_vec(),
            rows: values.len(),
            dim: 1,
        })
    }

    /// Number of rows (observations).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of features per row.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Whether the sample holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Borrow row `i` as a feature slice.
    ///
    /// # Panics
    /// Panics if `i >= rows()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row index {i} out of bounds");
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate over rows as feature slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dim)
    }

    /// Collect feature `j` across all rows.
    ///
    /// # Panics
    /// Panics if `j >= dim()`.
    #[must_use]
    pub fn column(&self, j: usize) -> Vec<f64> {
        assert!(j < self.dim, "column index {j} out of bounds");
        self.data.iter().skip(j).step_by(self.dim).copied().collect()
    }

    /// Borrow the raw row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// An ordered (source, target) pair of samples with identical dimensionality.
#[derive(Debug, Clone)]
pub struct DomainPair {
    source: Sample,
    target: Sample,
}

impl DomainPair {
    /// Bind a source and a target sample.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the two samples disagree on
    /// dimensionality. Cardinalities may differ.
    pub fn new(source: Sample, target: Sample) -> Result<Self> {
        if source.dim() != target.dim() {
            return Err(Error::DimensionMismatch {
                source_dim: source.dim(),
                target_dim: target.dim(),
            });
        }
        Ok(Self { source, target })
    }

    /// The source-domain sample.
    #[must_use]
    pub fn source(&self) -> &Sample {
        &self.source
    }

    /// The target-domain sample.
    #[must_use]
    pub fn target(&self) -> &Sample {
        &self.target
    }

    /// Shared dimensionality of both samples.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.source.dim()
    }
}
