//! Deterministic parallel k-means.
//!
//! `lloyd` is a small k-means engine for dense, fixed-width vectors in single or
//! double precision. The primary public API is under [`cluster`], which provides:
//! - nearest-center assignment and center update (one Lloyd pass)
//! - the convergence loop, with per-iteration progress reporting
//! - distortion (cost) evaluation of arbitrary center sets
//! - k-means++ seeding (classic or with greedy local trials), and uniform seeding
//! - a closed set of metrics, including minimal RMSD for 3-D conformations

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;

pub use cluster::{
    Clustering, Engine, EngineConfig, InitStrategy, Kmeans, KmeansFit, LoopOutcome, LoopParams,
    LoopStatus, MetricKind, Progress, ProgressSink, Scalar, SeedParams, Step,
};
pub use error::{Error, Result};
