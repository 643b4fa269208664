//! brecha - Domain-Gap Distances for Dataset Quality Assessment
//!
//! Quantifies how far apart two data distributions sit, using a family of
//! statistical distance/divergence estimators selected through one
//! declarative configuration surface:
//!
//! - **CMD** - Central Moment Discrepancy (moment matching)
//! - **MMD** - Maximum Mean Discrepancy (Gaussian kernel embedding)
//! - **Wasserstein** - exact 1-D optimal transport, or the sliced
//!   approximation over random projections
//! - **Proxy-A-Distance** - domain-classifier-based proxy
//! - **FID** - Frechet distance over pretrained embeddings
//! - **KLMVN** - closed-form KL divergence under multivariate-normal
//!   assumptions
//!
//! Estimators are pure, synchronous functions over in-memory [`Sample`]s:
//! no shared state, no internal retries, no fallback between methods.
//! Independent domain pairs can be processed in parallel by the caller
//! without coordination.
//!
//! # Quick Start
//!
//! ```
//! use brecha::{DomainPair, FeatureExtractor, GapConfig, GapMetric, MethodConfig};
//! # use std::sync::Arc;
//! # use arrow::array::{Float64Array, RecordBatch};
//! # use arrow::datatypes::{DataType, Field, Schema};
//!
//! # fn main() -> brecha::Result<()> {
//! # let schema = Arc::new(Schema::new(vec![
//! #     Field::new("x", DataType::Float64, false),
//! #     Field::new("y", DataType::Float64, false),
//! # ]));
//! # let source_batch = RecordBatch::try_new(
//! #     Arc::clone(&schema),
//! #     vec![
//! #         Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0, 4.0])),
//! #         Arc::new(Float64Array::from(vec![4.0, 3.0, 2.0, 1.0])),
//! #     ],
//! # )?;
//! # let target_batch = RecordBatch::try_new(
//! #     Arc::clone(&schema),
//! #     vec![
//! #         Arc::new(Float64Array::from(vec![11.0, 12.0, 13.0, 14.0])),
//! #         Arc::new(Float64Array::from(vec![14.0, 13.0, 12.0, 11.0])),
//! #     ],
//! # )?;
//! // Shape both domains into comparable samples
//! let extractor = FeatureExtractor::new(&["x", "y"]);
//! let source = extractor.extract(&source_batch)?;
//! let target = extractor.extract(&target_batch)?;
//! let pair = DomainPair::new(source, target)?;
//!
//! // Pick an estimator declaratively and run it
//! let config = GapConfig {
//!     method: MethodConfig::new("cmd").k(5),
//!     data: Default::default(),
//! };
//! let report = GapMetric::from_config(&config)?.compute(&pair)?;
//! assert!(report.distance > 0.0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod extract;
pub mod gap;
pub mod moments;
pub mod sample;

// Re-exports for convenience
pub use config::{
    ClassifierKind, DataConfig, GapConfig, Method, MethodConfig, DEFAULT_CMD_ORDER,
    DEFAULT_NUM_PROJECTIONS, DEFAULT_STABILITY_TOL, DEFAULT_TRAIN_RATIO,
};
pub use error::{Error, Result};
pub use extract::{extract_embeddings, EmbeddingProvider, FeatureExtractor};
pub use gap::{compute, GapMetric, GapReport, SlicedDistance};
pub use moments::DEFAULT_REG_EPS;
pub use sample::{DomainPair, Sample};
