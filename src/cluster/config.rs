//! Session and loop configuration.

use super::metric::MetricKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fixed parameters of a clustering session.
///
/// ```
/// use lloyd::{EngineConfig, MetricKind};
///
/// let config: EngineConfig =
///     serde_json::from_str(r#"{ "metric": "euclidean", "dimension": 2, "k": 3 }"#).unwrap();
/// assert_eq!(config.metric, MetricKind::Euclidean);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Distance metric, by name.
    #[serde(default)]
    pub metric: MetricKind,
    /// Row width shared by data and centers.
    pub dimension: usize,
    /// Number of centers.
    pub k: usize,
}

impl EngineConfig {
    pub fn new(metric: MetricKind, dimension: usize, k: usize) -> Self {
        Self { metric, dimension, k }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        self.metric.check_dimension(self.dimension)
    }
}

/// Stopping rule of the convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopParams {
    /// Iteration budget (at least 1).
    pub max_iter: usize,
    /// Stop once no center moves farther than this (non-negative).
    pub tolerance: f64,
}

impl Default for LoopParams {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tolerance: 1e-5,
        }
    }
}

impl LoopParams {
    pub fn new(max_iter: usize, tolerance: f64) -> Self {
        Self { max_iter, tolerance }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        // `!(x >= 0)` also rejects NaN.
        if !(self.tolerance >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be non-negative",
            });
        }
        Ok(())
    }
}
