//! K-means clustering for dense, fixed-width vectors.
//!
//! ## The objective
//!
//! Given points `x_1..x_n` in `R^d` and `k` centers, k-means minimizes the
//! distortion
//!
//! ```text
//! J = Σ_i min_c d(x_i, μ_c)²
//! ```
//!
//! ## Lloyd iterations
//!
//! 1. **Assign**: each point goes to its nearest center (lowest index on ties).
//! 2. **Update**: each center becomes the mean of its points; a center that
//!    received no points stays where it was.
//! 3. Repeat until no center moves by more than `tolerance`, or `max_iter`
//!    iterations have run.
//!
//! Under Euclidean distance each pass can only lower `J` (or leave it as is),
//! so the per-iteration costs form a non-increasing sequence.
//!
//! ## Seeding
//!
//! k-means++ picks the first center uniformly and every further one with
//! probability proportional to the squared distance to the closest center
//! chosen so far. It only ever copies data rows.
//!
//! ## Parallelism and reproducibility
//!
//! Assignment, cost, and the seeding distance updates run on a worker pool
//! sized by the caller (`0` = all cores). Points are split into contiguous
//! chunks, each chunk accumulates privately, and partial results are merged in
//! chunk order. The same input and thread budget therefore give bit-identical
//! results; different budgets agree up to floating-point rounding. Seeding is
//! identical for every thread budget.
//!
//! ## Usage
//!
//! ```rust
//! use lloyd::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```
//!
//! The lower-level [`Engine`] exposes the individual operations:
//!
//! ```rust
//! use lloyd::cluster::{Engine, EngineConfig, LoopParams, LoopStatus, MetricKind};
//! use ndarray::array;
//!
//! let data = array![[0.0f64, 0.0], [0.0, 0.2], [5.0, 5.0], [5.0, 5.2]];
//! let mut engine = Engine::new(EngineConfig::new(MetricKind::Euclidean, 2, 2)).unwrap();
//!
//! let init = engine.init_centers_kmpp(data.view(), 42, 0).unwrap();
//! let out = engine
//!     .cluster_loop(data.view(), init.view(), 0, LoopParams::new(50, 1e-6))
//!     .unwrap();
//! assert_eq!(out.status, LoopStatus::Converged);
//! assert!(engine.cost(data.view(), out.centers.view(), 0).unwrap() < 0.1);
//! ```

mod assign;
mod config;
mod cost;
mod engine;
mod kmeans;
mod metric;
mod parallel;
mod progress;
mod scalar;
mod seed;
mod traits;
mod util;

pub use config::{EngineConfig, LoopParams};
pub use engine::{Engine, LoopOutcome, LoopStatus, Step};
pub use kmeans::{Kmeans, KmeansFit};
pub use metric::{DistanceFn, MetricKind};
pub use progress::{Progress, ProgressSink};
pub use scalar::Scalar;
pub use seed::{InitStrategy, SeedParams};
pub use traits::Clustering;
