//! Domain-gap estimation facade.
//!
//! [`GapMetric`] resolves a validated [`Method`] from a [`GapConfig`] and
//! dispatches a [`DomainPair`] to the matching estimator. Dispatch is an
//! exhaustive match over the closed method variant: there is no fallback,
//! and an unsupported method never reaches estimator code.
//!
//! # Example
//!
//! ```
//! use brecha::{DomainPair, GapConfig, GapMetric, MethodConfig, Sample};
//!
//! # fn main() -> brecha::Result<()> {
//! let config = GapConfig {
//!     method: MethodConfig::new("wasserstein").dimension("swd").seed(42),
//!     data: Default::default(),
//! };
//!
//! let source = Sample::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]])?;
//! let target = Sample::from_rows(&[vec![5.0, 6.0], vec![6.0, 5.0], vec![5.5, 5.5]])?;
//! let pair = DomainPair::new(source, target)?;
//!
//! let report = GapMetric::from_config(&config)?.compute(&pair)?;
//! println!("{} distance: {:.4} in {:?}", report.method, report.distance, report.elapsed);
//! # Ok(())
//! # }
//! ```

mod cmd;
mod fid;
mod klmvn;
mod mmd;
mod proxy;
mod wasserstein;


use std::time::{Duration, Instant};

pub use wasserstein::SlicedDistance;

use crate::{
    config::{GapConfig, Method},
    error::Result,
    sample::DomainPair,
};

/// Result of one gap computation.
#[derive(Debug, Clone)]
pub struct GapReport {
    /// The configured method name (`METHOD.name`).
    pub method: &'static str,
    /// The computed distance/divergence. Nonnegative for every method;
    /// Proxy-A-Distance lands in `[0, 2]`.
    pub distance: f64,
    /// Wall-clock time spent inside the estimator. Observational only.
    pub elapsed: Duration,
    /// Per-projection distances, retained for sliced Wasserstein runs.
    pub projections: Option<Vec<f64>>,
}

/// Configured gap estimator, ready to run against domain pairs.
#[derive(Debug, Clone)]
pub struct GapMetric {
    method: Method,
}

impl GapMetric {
    /// Resolve and validate a configuration.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the unsupported method or missing
    /// field; no estimator work happens on failure.
    pub fn from_config(config: &GapConfig) -> Result<Self> {
        let method = Method::from_config(&config.method)?;
        Ok(Self { method })
    }

    /// Build a facade directly from a validated method.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method }
    }

    /// The resolved method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The configured method name.
    #[must_use]
    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    /// Run the configured estimator on a domain pair.
    ///
    /// Pure apart from the timing measurement; the pair is never mutated
    /// and nothing is cached across calls.
    ///
    /// # Errors
    /// Propagates the estimator's error taxonomy unchanged (degenerate
    /// samples, singular covariances, numerical instability, ...).
    pub fn compute(&self, pair: &DomainPair) -> Result<GapReport> {
        let source = pair.source();
        let target = pair.target();

        let start = Instant::now();
        let (distance, projections) = match &self.method {
            Method::Cmd { order } => (cmd::distance(source, target, *order)?, None),
            Method::Mmd { bandwidth } => (mmd::distance(source, target, *bandwidth)?, None),
            Method::Wasserstein1D => (wasserstein::distance_1d(source, target)?, None),
            Method::SlicedWasserstein {
                num_projections,
                seed,
            } => {
                let sliced = wasserstein::sliced(source, target, *num_projections, *seed)?;
                (sliced.mean, Some(sliced.per_projection))
            }
            Method::Proxy {
                classifier,
                train_ratio,
                seed,
            } => (
                proxy::distance(source, target, *classifier, *train_ratio, *seed)?,
                None,
            ),
            Method::Fid {
                reg_eps,
                stability_tol,
            } => (
                fid::distance(source, target, *reg_eps, *stability_tol)?,
                None,
            ),
            Method::Klmvn { reg_eps } => (klmvn::distance(source, target, *reg_eps)?, None),
        };
        let elapsed = start.elapsed();

        Ok(GapReport {
            method: self.method.name(),
            distance,
            elapsed,
            projections,
        })
    }
}

/// One-shot convenience: resolve the config and run it against a pair.
///
/// # Errors
/// Same taxonomy as [`GapMetric::from_config`] and [`GapMetric::compute`].
pub fn compute(config: &GapConfig, pair: &DomainPair) -> Result<GapReport> {
    GapMetric::from_config(config)?.compute(pair)
}
