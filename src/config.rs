//! Declarative configuration for domain-gap computations.
//!
//! [`GapConfig`] mirrors the JSON document handed over by the external
//! config loader: a `METHOD` table naming the estimator and its parameters,
//! and a `DATA` table of loader-resolved input locations. The engine never
//! mutates a config after construction.
//!
//! [`Method`] is the validated form: a closed variant over the six
//! supported estimators, resolved via [`Method::from_config`]. Dispatch on
//! it is exhaustive, so adding a method is a compile-time concern.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    moments::DEFAULT_REG_EPS,
};

/// Default CMD moment-matching order.
pub const DEFAULT_CMD_ORDER: u32 = 5;

/// Default number of sliced-Wasserstein projections.
pub const DEFAULT_NUM_PROJECTIONS: usize = 50;

/// Default train fraction for the Proxy-A-Distance domain classifier.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.7;

/// Default relative tolerance for negative eigenvalue noise in FID.
pub const DEFAULT_STABILITY_TOL: f64 = 1e-6;

/// Top-level configuration for one gap computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapConfig {
    /// Estimator selection and parameters.
    #[serde(rename = "METHOD")]
    pub method: MethodConfig,
    /// Input locations, resolved by the external loader.
    #[serde(rename = "DATA", default)]
    pub data: DataConfig,
}

/// Loader-resolved data locations. Opaque to the engine; carried only so a
/// caller can report where its samples came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Source-domain location (file path, dataset id, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Target-domain location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Feature columns selected for tabular methods.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// Raw `METHOD` table: the estimator name plus every method-specific
/// parameter the document may carry. Validation happens in
/// [`Method::from_config`], not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodConfig {
    /// Estimator name: one of `cmd|mmd|wasserstein|proxy|fid|klmvn`.
    pub name: String,
    /// Wasserstein dimension mode: `"1D"` or `"swd"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    /// CMD moment-matching order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    /// MMD Gaussian kernel bandwidth; omitted means median heuristic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
    /// Sliced-Wasserstein projection count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_projections: Option<usize>,
    /// Seed for the explicitly random methods (SWD, Proxy-A-Distance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Proxy-A-Distance classifier: `"linear"` or `"knn"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Proxy-A-Distance train fraction, in (0, 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_ratio: Option<f64>,
    /// Covariance regularization for FID/KLMVN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_eps: Option<f64>,
    /// FID negative-eigenvalue tolerance (relative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_tol: Option<f64>,
}

impl MethodConfig {
    /// Create a method table with the given name and no parameters set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension: None,
            k: None,
            bandwidth: None,
            num_projections: None,
            seed: None,
            classifier: None,
            train_ratio: None,
            reg_eps: None,
            stability_tol: None,
        }
    }

    /// Set the Wasserstein dimension mode.
    #[must_use]
    pub fn dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }

    /// Set the CMD order.
    #[must_use]
    pub fn k(mut self, k: u32) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the MMD bandwidth.
    #[must_use]
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    /// Set the SWD projection count.
    #[must_use]
    pub fn num_projections(mut self, num_projections: usize) -> Self {
        self.num_projections = Some(num_projections);
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the Proxy-A-Distance classifier name.
    #[must_use]
    pub fn classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Set the Proxy-A-Distance train fraction.
    #[must_use]
    pub fn train_ratio(mut self, train_ratio: f64) -> Self {
        self.train_ratio = Some(train_ratio);
        self
    }

    /// Set the covariance regularization epsilon.
    #[must_use]
    pub fn reg_eps(mut self, reg_eps: f64) -> Self {
        self.reg_eps = Some(reg_eps);
        self
    }
}

/// Binary domain classifier used by Proxy-A-Distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Ridge-regularized linear probe on +/-1 labels.
    Linear,
    /// 1-nearest-neighbor vote.
    NearestNeighbor,
}

/// A validated estimator selection. Closed over the six supported methods.
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    /// Central Moment Discrepancy.
    Cmd {
        /// Highest central-moment order matched (>= 1).
        order: u32,
    },
    /// Maximum Mean Discrepancy with a Gaussian kernel.
    Mmd {
        /// Kernel bandwidth; `None` selects the median heuristic.
        bandwidth: Option<f64>,
    },
    /// One-dimensional Wasserstein distance over a single feature.
    Wasserstein1D,
    /// Sliced Wasserstein distance over random projections.
    SlicedWasserstein {
        /// Number of random unit-vector projections (>= 1).
        num_projections: usize,
        /// Optional seed pinning the projection draws.
        seed: Option<u64>,
    },
    /// Proxy-A-Distance via a freshly trained domain classifier.
    Proxy {
        /// Classifier trained per call.
        classifier: ClassifierKind,
        /// Train fraction per domain, in (0, 1).
        train_ratio: f64,
        /// Optional seed pinning the train/validation split.
        seed: Option<u64>,
    },
    /// Frechet Inception Distance over embeddings.
    Fid {
        /// Covariance regularization epsilon.
        reg_eps: f64,
        /// Relative tolerance for negative eigenvalue noise.
        stability_tol: f64,
    },
    /// KL divergence under a multivariate-normal assumption.
    Klmvn {
        /// Covariance regularization epsilon.
        reg_eps: f64,
    },
}

impl Method {
    /// Resolve and validate the raw `METHOD` table.
    ///
    /// This is the single place an unsupported `METHOD.name` or an invalid
    /// parameter is rejected; it runs before any estimator executes.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the offending field.
    pub fn from_config(cfg: &MethodConfig) -> Result<Self> {
        match cfg.name.as_str() {
            "cmd" => {
                let order = cfg.k.unwrap_or(DEFAULT_CMD_ORDER);
                if order < 1 {
                    return Err(Error::invalid_config(format!(
                        "METHOD.k must be >= 1, got {order}"
                    )));
                }
                Ok(Self::Cmd { order })
            }
            "mmd" => {
                if let Some(b) = cfg.bandwidth {
                    if b <= 0.0 {
                        return Err(Error::invalid_config(format!(
                            "METHOD.bandwidth must be positive, got {b}"
                        )));
                    }
                }
                Ok(Self::Mmd {
                    bandwidth: cfg.bandwidth,
                })
            }
            "wasserstein" => match cfg.dimension.as_deref() {
                Some("1D") => Ok(Self::Wasserstein1D),
                Some("swd") => {
                    let num_projections =
                        cfg.num_projections.unwrap_or(DEFAULT_NUM_PROJECTIONS);
                    if num_projections < 1 {
                        return Err(Error::invalid_config(
                            "METHOD.num_projections must be >= 1",
                        ));
                    }
                    Ok(Self::SlicedWasserstein {
                        num_projections,
                        seed: cfg.seed,
                    })
                }
                Some(other) => Err(Error::invalid_config(format!(
                    "METHOD.dimension must be \"1D\" or \"swd\", got \"{other}\""
                ))),
                None => Err(Error::invalid_config(
                    "METHOD.dimension is required for wasserstein",
                )),
            },
            "proxy" => {
                let classifier = match cfg.classifier.as_deref() {
                    None | Some("linear") => ClassifierKind::Linear,
                    Some("knn") => ClassifierKind::NearestNeighbor,
                    Some(other) => {
                        return Err(Error::invalid_config(format!(
                            "METHOD.classifier must be \"linear\" or \"knn\", got \"{other}\""
                        )));
                    }
                };
                let train_ratio = cfg.train_ratio.unwrap_or(DEFAULT_TRAIN_RATIO);
                if !(train_ratio > 0.0 && train_ratio < 1.0) {
                    return Err(Error::invalid_config(format!(
                        "METHOD.train_ratio must be in (0, 1), got {train_ratio}"
                    )));
                }
                Ok(Self::Proxy {
                    classifier,
                    train_ratio,
                    seed: cfg.seed,
                })
            }
            "fid" => {
                let reg_eps = validate_reg_eps(cfg.reg_eps)?;
                let stability_tol = cfg.stability_tol.unwrap_or(DEFAULT_STABILITY_TOL);
                if stability_tol <= 0.0 {
                    return Err(Error::invalid_config(format!(
                        "METHOD.stability_tol must be positive, got {stability_tol}"
                    )));
                }
                Ok(Self::Fid {
                    reg_eps,
                    stability_tol,
                })
            }
            "klmvn" => {
                let reg_eps = validate_reg_eps(cfg.reg_eps)?;
                Ok(Self::Klmvn { reg_eps })
            }
            other => Err(Error::invalid_config(format!(
                "unsupported METHOD.name \"{other}\" \
                 (expected cmd|mmd|wasserstein|proxy|fid|klmvn)"
            ))),
        }
    }

    /// The configured method name, as it appears in `METHOD.name`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cmd { .. } => "cmd",
            Self::Mmd { .. } => "mmd",
            Self::Wasserstein1D | Self::SlicedWasserstein { .. } => "wasserstein",
            Self::Proxy { .. } => "proxy",
            Self::Fid { .. } => "fid",
            Self::Klmvn { .. } => "klmvn",
        }
    }
}

fn validate_reg_eps(reg_eps: Option<f64>) -> Result<f64> {
    let eps = reg_eps.unwrap_or(DEFAULT_REG_EPS);
    if eps < 0.0 {
        return Err(Error::invalid_config(format!(
            "METHOD.reg_eps must be nonnegative, got {eps}"
        )));
    }
    Ok(eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_defaults() {
        let method = Method::from_config(&MethodConfig::new("cmd")).expect("cmd");
        assert_eq!(method, Method::Cmd {
            order: DEFAULT_CMD_ORDER
        });
        assert_eq!(method.name(), "cmd");
    }

    #[test]
    fn test_cmd_rejects_zero_order() {
        let err = Method::from_config(&MethodConfig::new("cmd").k(0)).unwrap_err();
        assert!(err.to_string().contains("METHOD.k"));
    }

    #[test]
    fn test_mmd_rejects_nonpositive_bandwidth() {
        let err = Method::from_config(&MethodConfig::new("mmd").bandwidth(0.0)).unwrap_err();
        assert!(err.to_string().contains("METHOD.bandwidth"));
        assert!(Method::from_config(&MethodConfig::new("mmd").bandwidth(-2.0)).is_err());
    }

    #[test]
    fn test_mmd_bandwidth_optional() {
        let method = Method::from_config(&MethodConfig::new("mmd")).expect("mmd");
        assert_eq!(method, Method::Mmd { bandwidth: None });
    }

    #[test]
    fn test_wasserstein_requires_dimension() {
        let err = Method::from_config(&MethodConfig::new("wasserstein")).unwrap_err();
        assert!(err.to_string().contains("METHOD.dimension"));
    }

    #[test]
    fn test_wasserstein_modes() {
        let w1 = Method::from_config(&MethodConfig::new("wasserstein").dimension("1D"));
        assert_eq!(w1.expect("1D"), Method::Wasserstein1D);

        let swd = Method::from_config(
            &MethodConfig::new("wasserstein")
                .dimension("swd")
                .num_projections(128)
                .seed(7),
        )
        .expect("swd");
        assert_eq!(swd, Method::SlicedWasserstein {
            num_projections: 128,
            seed: Some(7)
        });
        assert_eq!(swd.name(), "wasserstein");
    }

    #[test]
    fn test_wasserstein_rejects_unknown_mode() {
        let err = Method::from_config(&MethodConfig::new("wasserstein").dimension("2D"))
            .unwrap_err();
        assert!(err.to_string().contains("2D"));
    }

    #[test]
    fn test_swd_rejects_zero_projections() {
        let cfg = MethodConfig::new("wasserstein")
            .dimension("swd")
            .num_projections(0);
        assert!(Method::from_config(&cfg).is_err());
    }

    #[test]
    fn test_proxy_defaults() {
        let method = Method::from_config(&MethodConfig::new("proxy")).expect("proxy");
        assert_eq!(method, Method::Proxy {
            classifier: ClassifierKind::Linear,
            train_ratio: DEFAULT_TRAIN_RATIO,
            seed: None
        });
    }

    #[test]
    fn test_proxy_knn_classifier() {
        let method =
            Method::from_config(&MethodConfig::new("proxy").classifier("knn")).expect("proxy");
        assert!(matches!(method, Method::Proxy {
            classifier: ClassifierKind::NearestNeighbor,
            ..
        }));
    }

    #[test]
    fn test_proxy_rejects_unknown_classifier() {
        let err =
            Method::from_config(&MethodConfig::new("proxy").classifier("svm")).unwrap_err();
        assert!(err.to_string().contains("svm"));
    }

    #[test]
    fn test_proxy_rejects_bad_train_ratio() {
        assert!(Method::from_config(&MethodConfig::new("proxy").train_ratio(0.0)).is_err());
        assert!(Method::from_config(&MethodConfig::new("proxy").train_ratio(1.0)).is_err());
    }

    #[test]
    fn test_fid_defaults() {
        let method = Method::from_config(&MethodConfig::new("fid")).expect("fid");
        assert_eq!(method, Method::Fid {
            reg_eps: DEFAULT_REG_EPS,
            stability_tol: DEFAULT_STABILITY_TOL
        });
    }

    #[test]
    fn test_klmvn_rejects_negative_eps() {
        let err = Method::from_config(&MethodConfig::new("klmvn").reg_eps(-1.0)).unwrap_err();
        assert!(err.to_string().contains("METHOD.reg_eps"));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = Method::from_config(&MethodConfig::new("unknown")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown"));
        assert!(msg.contains("METHOD.name"));
    }

    #[test]
    fn test_no_silent_fallback_between_methods() {
        // A klmvn config must never resolve to a different estimator even
        // when it carries parameters other methods would accept.
        let cfg = MethodConfig::new("klmvn").bandwidth(1.0).k(3);
        let method = Method::from_config(&cfg).expect("klmvn");
        assert_eq!(method.name(), "klmvn");
    }
}
