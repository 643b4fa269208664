//! Error types for brecha.

/// Result type alias for brecha operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when computing domain-gap distances.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration: unsupported method name or a missing/out-of-range
    /// method parameter. Surfaced before any estimator executes.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error, naming the offending field.
        message: String,
    },

    /// Source and target samples have different dimensionality.
    #[error("Dimension mismatch: source has {source_dim} features, target has {target_dim}")]
    DimensionMismatch {
        /// Dimensionality of the source sample.
        source_dim: usize,
        /// Dimensionality of the target sample.
        target_dim: usize,
    },

    /// A sample is too small for the requested statistic.
    #[error("Degenerate sample for {method}: {rows} rows, need at least {required}")]
    DegenerateSample {
        /// The method that rejected the sample.
        method: &'static str,
        /// Number of rows in the offending sample.
        rows: usize,
        /// Minimum number of rows the method requires.
        required: usize,
    },

    /// A domain's sample cannot be split into train and validation parts.
    #[error("Insufficient data for {method}: {message}")]
    InsufficientData {
        /// The method that could not proceed.
        method: &'static str,
        /// Description of what was missing.
        message: String,
    },

    /// A covariance matrix is not invertible even after regularization.
    #[error("Singular covariance in {method}: {message}")]
    SingularCovariance {
        /// The method whose covariance factorization failed.
        method: &'static str,
        /// Description of the failing matrix.
        message: String,
    },

    /// A computation left the numerically trusted regime.
    #[error("Numerical instability in {method}: {message}")]
    NumericalInstability {
        /// The method that detected the instability.
        method: &'static str,
        /// Description of the violated tolerance.
        message: String,
    },

    /// Raw input could not be turned into a feature sample.
    #[error("Feature extraction failed: {message}")]
    FeatureExtraction {
        /// Description of the extraction failure.
        message: String,
    },

    /// Arrow error while reading column data.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a degenerate sample error.
    #[must_use]
    pub fn degenerate(method: &'static str, rows: usize, required: usize) -> Self {
        Self::DegenerateSample {
            method,
            rows,
            required,
        }
    }

    /// Create an insufficient data error.
    pub fn insufficient(method: &'static str, message: impl Into<String>) -> Self {
        Self::InsufficientData {
            method,
            message: message.into(),
        }
    }

    /// Create a singular covariance error.
    pub fn singular(method: &'static str, message: impl Into<String>) -> Self {
        Self::SingularCovariance {
            method,
            message: message.into(),
        }
    }

    /// Create a numerical instability error.
    pub fn unstable(method: &'static str, message: impl Into<String>) -> Self {
        Self::NumericalInstability {
            method,
            message: message.into(),
        }
    }

    /// Create a feature extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::FeatureExtraction {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config() {
        let err = Error::invalid_config("METHOD.k must be >= 1");
        assert!(err.to_string().contains("METHOD.k must be >= 1"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::DimensionMismatch {
            source_dim: 3,
            target_dim: 5,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn test_degenerate_sample() {
        let err = Error::degenerate("fid", 1, 3);
        let msg = err.to_string();
        assert!(msg.contains("fid"));
        assert!(msg.contains("1 rows"));
        assert!(msg.contains("at least 3"));
    }

    #[test]
    fn test_insufficient_data() {
        let err = Error::insufficient("proxy", "source domain has 1 row");
        assert!(err.to_string().contains("proxy"));
        assert!(err.to_string().contains("source domain has 1 row"));
    }

    #[test]
    fn test_singular_covariance() {
        let err = Error::singular("klmvn", "target covariance has no Cholesky factor");
        assert!(err.to_string().contains("klmvn"));
        assert!(err.to_string().contains("Cholesky"));
    }

    #[test]
    fn test_numerical_instability() {
        let err = Error::unstable("fid", "eigenvalue -0.5 below tolerance");
        assert!(err.to_string().contains("fid"));
        assert!(err.to_string().contains("eigenvalue"));
    }

    #[test]
    fn test_feature_extraction() {
        let err = Error::extraction("column 'age' not found");
        assert!(err.to_string().contains("column 'age' not found"));
    }
}
