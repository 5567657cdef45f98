//! The clustering session.
//!
//! An [`Engine`] is configured once with a metric, the row width `D`, and the
//! number of centers `K`, and then serves the data-bearing operations:
//!
//! | operation                      | what it does                                   |
//! |--------------------------------|------------------------------------------------|
//! | [`Engine::cluster`]            | one assignment + update pass                   |
//! | [`Engine::cluster_loop`]       | Lloyd iterations until converged or out of budget |
//! | [`Engine::cost`]               | distortion of a center set                     |
//! | [`Engine::step`]               | one pass, also returning labels and counts     |
//! | [`Engine::assign`]             | nearest-center label per point                 |
//! | [`Engine::predict`]            | labels for new points (any count)              |
//! | [`Engine::init_centers_kmpp`]  | k-means++ seeding                              |
//!
//! Every operation checks shapes (and finiteness) up front, before any worker
//! is started, and never writes to the caller's matrices: results are always
//! new arrays.
//!
//! ## Convergence loop
//!
//! Each iteration runs one pass, measures the displacement (the largest
//! distance, under the session metric, between a center and its update),
//! adopts the new centers, and reports to the progress sink. It stops with
//! [`LoopStatus::Converged`] once the displacement is at most `tolerance`, or
//! with [`LoopStatus::MaxIterReached`] after `max_iter` iterations. Both are
//! successful outcomes.

use super::assign;
use super::config::{EngineConfig, LoopParams};
use super::cost;
use super::metric::{Metric, MetricKind};
use super::parallel::WorkerPool;
use super::progress::{Progress, ProgressSink};
use super::scalar::Scalar;
use super::seed::{self, SeedParams};
use super::util::{ensure_finite, Contiguous, Rows};
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use std::fmt;

/// How a convergence loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Displacement dropped to `tolerance` or below.
    Converged,
    /// The iteration budget ran out first.
    MaxIterReached,
}

impl LoopStatus {
    pub fn is_converged(self) -> bool {
        self == LoopStatus::Converged
    }
}

/// Result of [`Engine::cluster_loop`].
#[derive(Debug, Clone)]
pub struct LoopOutcome<T> {
    /// Final centers.
    pub centers: Array2<T>,
    /// Iterations executed (at least 1).
    pub iterations: usize,
    /// Why the loop stopped.
    pub status: LoopStatus,
    /// Displacement of the last iteration.
    pub displacement: f64,
    /// Distortion of the last iteration's partition.
    pub cost: f64,
}

/// Result of a single assignment + update pass.
#[derive(Debug, Clone)]
pub struct Step<T> {
    /// Updated centers.
    pub centers: Array2<T>,
    /// Nearest input center per point.
    pub labels: Vec<usize>,
    /// Points per cluster.
    pub counts: Vec<usize>,
    /// Distortion of the input centers.
    pub cost: f64,
}

/// A configured k-means session over element type `T`.
pub struct Engine<T: Scalar> {
    config: EngineConfig,
    metric: Metric<T>,
    sink: Option<Box<dyn ProgressSink<T> + Send>>,
}

impl<T: Scalar> fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("progress_sink", &self.sink.is_some())
            .finish()
    }
}

impl<T: Scalar> Engine<T> {
    /// Validate `config` and create a session.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metric: Metric::new(config.metric),
            sink: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metric(&self) -> MetricKind {
        self.config.metric
    }

    /// Register the sink [`Engine::cluster_loop`] reports to, replacing any previous one.
    pub fn set_progress_sink<S>(&mut self, sink: S)
    where
        S: ProgressSink<T> + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
    }

    /// Remove the progress sink; the loop then reports nowhere.
    pub fn clear_progress_sink(&mut self) {
        self.sink = None;
    }

    /// One assignment + update pass; returns the new centers.
    ///
    /// `threads = 0` uses every available core.
    pub fn cluster(
        &self,
        data: ArrayView2<'_, T>,
        centers: ArrayView2<'_, T>,
        threads: usize,
    ) -> Result<Array2<T>> {
        Ok(self.step(data, centers, threads)?.centers)
    }

    /// One assignment + update pass, with the assignment that produced it.
    pub fn step(
        &self,
        data: ArrayView2<'_, T>,
        centers: ArrayView2<'_, T>,
        threads: usize,
    ) -> Result<Step<T>> {
        let data = self.checked_data(data)?;
        let centers = self.checked_centers(centers)?;
        let pool = WorkerPool::new(threads)?;

        let acc = assign::accumulate(&pool, data.rows(), centers.rows(), self.metric);
        let updated = assign::update_centers(&acc, centers.rows());
        Ok(Step {
            centers: Array2::from_shape_vec((self.config.k, self.config.dimension), updated)?,
            labels: acc.labels,
            counts: acc.counts,
            cost: acc.cost,
        })
    }

    /// Run Lloyd iterations from `centers` until convergence or `params.max_iter`.
    pub fn cluster_loop(
        &mut self,
        data: ArrayView2<'_, T>,
        centers: ArrayView2<'_, T>,
        threads: usize,
        params: LoopParams,
    ) -> Result<LoopOutcome<T>> {
        params.validate()?;
        let data = self.checked_data(data)?;
        let initial = self.checked_centers(centers)?;
        let pool = WorkerPool::new(threads)?;

        let (k, d) = (self.config.k, self.config.dimension);
        let rows = data.rows();
        let mut current: Vec<T> = initial.rows().as_slice().to_vec();

        log::debug!(
            "cluster_loop: n={} k={k} d={d} metric={} workers={} max_iter={} tol={:e}",
            rows.len(),
            self.config.metric,
            pool.workers(),
            params.max_iter,
            params.tolerance
        );

        let mut displacement = f64::INFINITY;
        let mut cost = f64::INFINITY;
        for iteration in 1..=params.max_iter {
            let acc = assign::accumulate(&pool, rows, Rows::new(&current, d), self.metric);
            let next = assign::update_centers(&acc, Rows::new(&current, d));
            displacement =
                assign::max_displacement(Rows::new(&current, d), Rows::new(&next, d), self.metric);
            cost = acc.cost;
            current = next;

            log::debug!("iteration {iteration}: cost={cost:.6e} displacement={displacement:.3e}");

            if let Some(sink) = self.sink.as_mut() {
                sink.on_iteration(&Progress {
                    iteration,
                    max_iter: params.max_iter,
                    displacement,
                    cost,
                    centers: ArrayView2::from_shape((k, d), &current)?,
                });
            }

            if displacement <= params.tolerance {
                log::info!("k-means converged after {iteration} iterations (cost {cost:.6e})");
                return Ok(LoopOutcome {
                    centers: Array2::from_shape_vec((k, d), current)?,
                    iterations: iteration,
                    status: LoopStatus::Converged,
                    displacement,
                    cost,
                });
            }
        }

        log::info!(
            "k-means stopped at max_iter={} (displacement {displacement:.3e} > tol {:e})",
            params.max_iter,
            params.tolerance
        );
        Ok(LoopOutcome {
            centers: Array2::from_shape_vec((k, d), current)?,
            iterations: params.max_iter,
            status: LoopStatus::MaxIterReached,
            displacement,
            cost,
        })
    }

    /// Sum over points of the squared distance to the nearest center.
    pub fn cost(
        &self,
        data: ArrayView2<'_, T>,
        centers: ArrayView2<'_, T>,
        threads: usize,
    ) -> Result<f64> {
        let data = self.checked_data(data)?;
        let centers = self.checked_centers(centers)?;
        let pool = WorkerPool::new(threads)?;
        Ok(cost::distortion(&pool, data.rows(), centers.rows(), self.metric))
    }

    /// Index of the nearest center for every point.
    pub fn assign(
        &self,
        data: ArrayView2<'_, T>,
        centers: ArrayView2<'_, T>,
        threads: usize,
    ) -> Result<Vec<usize>> {
        let data = self.checked_data(data)?;
        let centers = self.checked_centers(centers)?;
        let pool = WorkerPool::new(threads)?;
        Ok(assign::labels(&pool, data.rows(), centers.rows(), self.metric))
    }

    /// Label new points against fitted centers.
    ///
    /// Unlike the clustering operations this accepts fewer points than
    /// centers, e.g. a single query row.
    pub fn predict(
        &self,
        data: ArrayView2<'_, T>,
        centers: ArrayView2<'_, T>,
        threads: usize,
    ) -> Result<Vec<usize>> {
        let data = self.checked_points(data)?;
        let centers = self.checked_centers(centers)?;
        let pool = WorkerPool::new(threads)?;
        Ok(assign::labels(&pool, data.rows(), centers.rows(), self.metric))
    }

    /// Classic k-means++ seeding: `K` rows copied from `data`.
    pub fn init_centers_kmpp(
        &self,
        data: ArrayView2<'_, T>,
        seed: u64,
        threads: usize,
    ) -> Result<Array2<T>> {
        self.init_centers_kmpp_with(data, seed, threads, SeedParams::classic())
    }

    /// k-means++ seeding with explicit parameters (e.g. greedy local trials).
    pub fn init_centers_kmpp_with(
        &self,
        data: ArrayView2<'_, T>,
        seed: u64,
        threads: usize,
        params: SeedParams,
    ) -> Result<Array2<T>> {
        params.validate()?;
        let data = self.checked_data(data)?;
        let pool = WorkerPool::new(threads)?;
        let picks = seed::kmeans_pp(&pool, data.rows(), self.config.k, self.metric, seed, params)?;
        log::debug!("kmeans++ picked rows {picks:?}");
        self.rows_to_centers(data.rows(), &picks)
    }

    /// `K` distinct rows of `data` chosen uniformly at random.
    pub fn init_centers_uniform(&self, data: ArrayView2<'_, T>, seed: u64) -> Result<Array2<T>> {
        let data = self.checked_data(data)?;
        let picks = seed::uniform(data.nrows(), self.config.k, seed);
        self.rows_to_centers(data.rows(), &picks)
    }

    fn rows_to_centers(&self, rows: Rows<'_, T>, picks: &[usize]) -> Result<Array2<T>> {
        let values = seed::gather(rows, picks);
        Ok(Array2::from_shape_vec((self.config.k, self.config.dimension), values)?)
    }

    fn checked_data<'a>(&self, data: ArrayView2<'a, T>) -> Result<Contiguous<'a, T>> {
        if self.config.k > data.nrows() && data.nrows() > 0 {
            return Err(Error::InvalidClusterCount {
                requested: self.config.k,
                n_items: data.nrows(),
            });
        }
        self.checked_points(data)
    }

    /// Shape and finiteness checks without the `K <= N` requirement.
    fn checked_points<'a>(&self, data: ArrayView2<'a, T>) -> Result<Contiguous<'a, T>> {
        let (n, d) = data.dim();
        if n == 0 || d == 0 {
            return Err(Error::EmptyInput);
        }
        if d != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                found: d,
            });
        }
        let data = Contiguous::new(data);
        ensure_finite("data", data.rows().as_slice())?;
        Ok(data)
    }

    fn checked_centers<'a>(&self, centers: ArrayView2<'a, T>) -> Result<Contiguous<'a, T>> {
        let (k, d) = centers.dim();
        if d != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                found: d,
            });
        }
        if k != self.config.k {
            return Err(Error::ShapeMismatch {
                what: "centers",
                expected: self.config.k,
                found: k,
            });
        }
        let centers = Contiguous::new(centers);
        ensure_finite("centers", centers.rows().as_slice())?;
        Ok(centers)
    }
}
