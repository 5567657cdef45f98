//! K-means estimator: seeding followed by the convergence loop.
//!
//! This is the convenience layer over [`Engine`]: it accepts `&[Vec<T>]`,
//! validates it, seeds centers (k-means++ by default), runs Lloyd iterations,
//! and returns the fitted centers with the final labels.

use super::config::{EngineConfig, LoopParams};
use super::engine::{Engine, LoopStatus};
use super::metric::MetricKind;
use super::scalar::Scalar;
use super::seed::{InitStrategy, SeedParams};
use super::traits::Clustering;
use super::util::flatten_rows;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use rand::Rng;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    metric: MetricKind,
    /// Maximum Lloyd iterations.
    max_iter: usize,
    /// Largest center movement still counted as converged.
    tol: f64,
    /// Random seed for initialization; drawn from entropy when unset.
    seed: Option<u64>,
    /// Worker threads; 0 means all cores.
    threads: usize,
    init: InitStrategy,
    local_trials: usize,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        let defaults = LoopParams::default();
        Self {
            k,
            metric: MetricKind::Euclidean,
            max_iter: defaults.max_iter,
            tol: defaults.tolerance,
            seed: None,
            threads: 0,
            init: InitStrategy::KmeansPlusPlus,
            local_trials: 1,
        }
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the worker thread count (0 = all cores).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the seeding strategy.
    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    /// Candidates per k-means++ round (1 = classic).
    pub fn with_local_trials(mut self, local_trials: usize) -> Self {
        self.local_trials = local_trials;
        self
    }

    /// Fit centers to `data`.
    pub fn fit<T: Scalar>(&self, data: &[Vec<T>]) -> Result<KmeansFit<T>> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        let n = data.len();
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let (flat, dim) = flatten_rows(data)?;
        let view = ArrayView2::from_shape((n, dim), &flat)?;
        let mut engine = Engine::<T>::new(EngineConfig::new(self.metric, dim, self.k))?;

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let initial = match self.init {
            InitStrategy::KmeansPlusPlus => engine.init_centers_kmpp_with(
                view,
                seed,
                self.threads,
                SeedParams {
                    local_trials: self.local_trials,
                },
            )?,
            InitStrategy::Uniform => engine.init_centers_uniform(view, seed)?,
        };

        let outcome = engine.cluster_loop(
            view,
            initial.view(),
            self.threads,
            LoopParams::new(self.max_iter, self.tol),
        )?;
        let labels = engine.assign(view, outcome.centers.view(), self.threads)?;
        let cost = engine.cost(view, outcome.centers.view(), self.threads)?;

        Ok(KmeansFit {
            centroids: outcome.centers,
            labels,
            cost,
            iterations: outcome.iterations,
            status: outcome.status,
            metric: self.metric,
            threads: self.threads,
        })
    }
}

impl<T: Scalar> Clustering<T> for Kmeans {
    fn fit_predict(&self, data: &[Vec<T>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// A fitted K-means model.
#[derive(Debug, Clone)]
pub struct KmeansFit<T> {
    /// Cluster centers, one row per cluster.
    pub centroids: Array2<T>,
    /// Label of each training point under `centroids`.
    pub labels: Vec<usize>,
    /// Distortion of the training data under `centroids`.
    pub cost: f64,
    /// Lloyd iterations executed.
    pub iterations: usize,
    /// Whether the loop converged or ran out of iterations.
    pub status: LoopStatus,
    metric: MetricKind,
    threads: usize,
}

impl<T: Scalar> KmeansFit<T> {
    /// Nearest fitted center for each point of `data`.
    pub fn predict(&self, data: &[Vec<T>]) -> Result<Vec<usize>> {
        let (flat, dim) = flatten_rows(data)?;
        let view = ArrayView2::from_shape((data.len(), dim), &flat)?;
        let engine = Engine::<T>::new(EngineConfig::new(
            self.metric,
            self.centroids.ncols(),
            self.centroids.nrows(),
        ))?;
        engine.predict(view, self.centroids.view(), self.threads)
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn metric(&self) -> MetricKind {
        self.metric
    }
}
