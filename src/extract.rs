//! Feature extraction: raw per-domain input into [`Sample`]s.
//!
//! Tabular data is a direct numeric projection of the named columns of an
//! Arrow `RecordBatch`. Image data goes through an [`EmbeddingProvider`]
//! that maps each image into a fixed, pretrained feature space.

use std::sync::Arc;

use arrow::{
    array::{Array, AsArray},
    datatypes::DataType,
    record_batch::RecordBatch,
};

use crate::{
    error::{Error, Result},
    sample::Sample,
};

/// Extracts numeric feature samples from Arrow RecordBatches.
///
/// The extraction is a direct numeric projection: each named column becomes
/// one feature dimension, with no transformation applied.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Column names to extract, in feature order.
    columns: Vec<String>,
}

impl FeatureExtractor {
    /// Creates a new extractor for the specified columns.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Creates an extractor from owned column names.
    #[must_use]
    pub fn from_columns(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Returns the column names being extracted.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Extracts the configured columns into a [`Sample`].
    ///
    /// # Errors
    ///
    /// Returns `FeatureExtraction` if:
    /// - no columns are configured or the batch has no rows
    /// - a requested column doesn't exist
    /// - a column contains non-numeric data
    /// - a value is null or non-finite
    pub fn extract(&self, batch: &RecordBatch) -> Result<Sample> {
        let rows = batch.num_rows();
        let cols = self.columns.len();

        if cols == 0 {
            return Err(Error::extraction("no feature columns configured"));
        }
        if rows == 0 {
            return Err(Error::extraction("input batch has no rows"));
        }

        let mut data = vec![0.0f64; rows * cols];

        for (col_idx, col_name) in self.columns.iter().enumerate() {
            let col_index = batch.schema().index_of(col_name).map_err(|_| {
                Error::extraction(format!("column '{col_name}' not found in batch"))
            })?;

            let array = batch.column(col_index);
            extract_column(array, col_name, &mut data, col_idx, cols, rows)?;
        }

        Sample::from_vec(data, rows, cols)
    }
}

/// Read one numeric column into the row-major buffer.
fn extract_column(
    array: &Arc<dyn Array>,
    col_name: &str,
    data: &mut [f64],
    col_idx: usize,
    num_cols: usize,
    num_rows: usize,
) -> Result<()> {
    macro_rules! read_primitive {
        ($arrow_ty:ty) => {{
            let arr = array.as_primitive::<$arrow_ty>();
            for row in 0..num_rows {
                if arr.is_null(row) {
                    return Err(Error::extraction(format!(
                        "column '{col_name}' has a null value at row {row}"
                    )));
                }
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                {
                    data[row * num_cols + col_idx] = arr.value(row) as f64;
                }
            }
        }};
    }

    match array.data_type() {
        DataType::Float32 => read_primitive!(arrow::datatypes::Float32Type),
        DataType::Float64 => read_primitive!(arrow::datatypes::Float64Type),
        DataType::Int8 => read_primitive!(arrow::datatypes::Int8Type),
        DataType::Int16 => read_primitive!(arrow::datatypes::Int16Type),
        DataType::Int32 => read_primitive!(arrow::datatypes::Int32Type),
        DataType::Int64 => read_primitive!(arrow::datatypes::Int64Type),
        DataType::UInt8 => read_primitive!(arrow::datatypes::UInt8Type),
        DataType::UInt16 => read_primitive!(arrow::datatypes::UInt16Type),
        DataType::UInt32 => read_primitive!(arrow::datatypes::UInt32Type),
        DataType::UInt64 => read_primitive!(arrow::datatypes::UInt64Type),
        dt => {
            return Err(Error::extraction(format!(
                "column '{col_name}' has non-numeric type {dt:?}"
            )));
        }
    }

    // Reject NaN/inf now so downstream statistics never see them
    for row in 0..num_rows {
        let v = data[row * num_cols + col_idx];
        if !v.is_finite() {
            return Err(Error::extraction(format!(
                "column '{col_name}' has non-finite value {v} at row {row}"
            )));
        }
    }

    Ok(())
}

/// A pretrained, fixed-dimensional image feature space.
///
/// Implementations must be deterministic: embedding the same input twice
/// yields the same vector, so repeated extractions are reproducible. The
/// pretrained model itself is an upstream collaborator; brecha only consumes
/// its output.
pub trait EmbeddingProvider {
    /// Dimensionality of the produced embeddings.
    fn dim(&self) -> usize;

    /// Embed one encoded image into the feature space.
    ///
    /// # Errors
    /// Returns `FeatureExtraction` if the image cannot be decoded.
    fn embed(&self, image: &[u8]) -> Result<Vec<f64>>;
}

/// Embed a batch of images into a [`Sample`] via the given provider.
///
/// # Errors
///
/// Returns `FeatureExtraction` if the batch is empty, an image cannot be
/// decoded, or a returned embedding disagrees with `provider.dim()`.
pub fn extract_embeddings<P: EmbeddingProvider>(provider: &P, images: &[&[u8]]) -> Result<Sample> {
    if images.is_empty() {
        return Err(Error::extraction("cannot embed an empty image batch"));
    }

    let dim = provider.dim();
    let mut data = Vec::with_capacity(images.len() * dim);

    for (i, image) in images.iter().enumerate() {
        let embedding = provider.embed(image)?;
        if embedding.len() != dim {
            return Err(Error::extraction(format!(
                "embedding for image {} has {} features, provider declares {}",
                i,
                embedding.len(),
                dim
            )));
        }
        if let Some(v) = embedding.iter().find(|v| !v.is_finite()) {
            return Err(Error::extraction(format!(
                "embedding for image {i} contains non-finite value {v}"
            )));
        }
        data.extend_from_slice(&embedding);
    }

    Sample::from_vec(data, images.len(), dim)
}

#[cfg(test)]
mod tests {
    use arrow::{
        array::{Float64Array, Int32Array, StringArray},
        datatypes::{Field, Schema},
    };

    use super::*;

    fn make_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Float64, false),
            Field::new("score", DataType::Int32, false),
            Field::new("name", DataType::Utf8, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![30.0, 45.5, 28.0])),
                Arc::new(Int32Array::from(vec![7, 9, 3])),
                Arc::new(StringArray::from(vec!["a", "b", "c"])),
            ],
        )
        .expect("batch")
    }

    #[test]
    fn test_extract_numeric_projection() {
        let batch = make_batch();
        let extractor = FeatureExtractor::new(&["age", "score"]);
        let sample = extractor.extract(&batch).expect("extract");

        assert_eq!(sample.rows(), 3);
        assert_eq!(sample.dim(), 2);
        assert_eq!(sample.row(1), &[45.5, 9.0]);
    }

    #[test]
    fn test_extract_column_order_defines_feature_order() {
        let batch = make_batch();
        let extractor = FeatureExtractor::new(&["score", "age"]);
        let sample = extractor.extract(&batch).expect("extract");
        assert_eq!(sample.row(0), &[7.0, 30.0]);
    }

    #[test]
    fn test_extract_missing_column() {
        let batch = make_batch();
        let extractor = FeatureExtractor::new(&["age", "income"]);
        let err = extractor.extract(&batch).unwrap_err();
        assert!(matches!(err, Error::FeatureExtraction { .. }));
        assert!(err.to_string().contains("income"));
    }

    #[test]
    fn test_extract_non_numeric_column() {
        let batch = make_batch();
        let extractor = FeatureExtractor::new(&["name"]);
        let err = extractor.extract(&batch).unwrap_err();
        assert!(matches!(err, Error::FeatureExtraction { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_extract_null_value_fails() {
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Float64, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![Some(1.0), None]))],
        )
        .expect("batch");

        let extractor = FeatureExtractor::new(&["x"]);
        let err = extractor.extract(&batch).unwrap_err();
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_extract_non_finite_fails() {
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Float64, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![1.0, f64::NAN]))],
        )
        .expect("batch");

        let extractor = FeatureExtractor::new(&["x"]);
        assert!(extractor.extract(&batch).is_err());
    }

    #[test]
    fn test_extract_no_columns_fails() {
        let batch = make_batch();
        let extractor = FeatureExtractor::from_columns(Vec::new());
        assert!(extractor.extract(&batch).is_err());
    }

    /// Deterministic stand-in for a pretrained feature space.
    struct ByteSumProvider {
        dim: usize,
    }

    impl EmbeddingProvider for ByteSumProvider {
        fn dim(&self) -> usize {
            self.dim
        }

        fn embed(&self, image: &[u8]) -> Result<Vec<f64>> {
            if image.is_empty() {
                return Err(Error::extraction("cannot decode empty image"));
            }
            let sum: f64 = image.iter().map(|&b| f64::from(b)).sum();
            Ok((0..self.dim).map(|j| sum + j as f64).collect())
        }
    }

    #[test]
    fn test_extract_embeddings() {
        let provider = ByteSumProvider { dim: 4 };
        let images: Vec<&[u8]> = vec![&[1, 2, 3], &[10, 20]];
        let sample = extract_embeddings(&provider, &images).expect("embed");

        assert_eq!(sample.rows(), 2);
        assert_eq!(sample.dim(), 4);
        assert_eq!(sample.row(0), &[6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_extract_embeddings_is_deterministic() {
        let provider = ByteSumProvider { dim: 2 };
        let images: Vec<&[u8]> = vec![&[5, 5]];
        let a = extract_embeddings(&provider, &images).expect("embed");
        let b = extract_embeddings(&provider, &images).expect("embed");
        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_embeddings_decode_failure_propagates() {
        let provider = ByteSumProvider { dim: 2 };
        let images: Vec<&[u8]> = vec![&[]];
        let err = extract_embeddings(&provider, &images).unwrap_err();
        assert!(matches!(err, Error::FeatureExtraction { .. }));
    }

    #[test]
    fn test_extract_embeddings_empty_batch() {
        let provider = ByteSumProvider { dim: 2 };
        assert!(extract_embeddings(&provider, &[]).is_err());
    }
}
