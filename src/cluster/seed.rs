//! Initial center selection.
//!
//! # k-means++ (Arthur & Vassilvitskii, 2007)
//!
//! 1. Pick the first center uniformly among the data points.
//! 2. Keep, per point, `w_i` = squared distance to the nearest chosen center.
//! 3. Draw the next center with probability `w_i / Σ w`.
//! 4. Fold the new center into `w` with a `min`, and repeat until `k` are chosen.
//!
//! Step 4 is the only O(n) work per round and runs on the worker pool; the draw
//! itself walks the weights sequentially on the calling thread with a single
//! `StdRng` stream, so the chosen indices depend only on the seed and the data,
//! never on the thread budget.
//!
//! If every remaining weight is zero (all points coincide with chosen centers),
//! the next center is drawn uniformly among the points not yet chosen. A total
//! that overflows `f64` is an error instead: the draw would no longer follow
//! the D² distribution.
//!
//! ## Greedy local trials
//!
//! With `local_trials > 1`, each round draws that many candidates from the same
//! distribution and keeps the one giving the smallest potential `Σ_i min(w_i,
//! d(x_i, candidate)²)`. `local_trials = 1` is the classic algorithm.
//!
//! # Uniform
//!
//! `k` distinct rows chosen uniformly without replacement.

use super::metric::Metric;
use super::parallel::WorkerPool;
use super::scalar::Scalar;
use super::util::Rows;
use crate::error::{Error, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Seeding strategy used by the high-level estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitStrategy {
    /// k-means++ (D² weighting).
    #[default]
    #[serde(alias = "kmeans++", alias = "k-means++")]
    KmeansPlusPlus,
    /// Distinct rows chosen uniformly at random.
    Uniform,
}

/// Parameters for k-means++ seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedParams {
    /// Candidates drawn per round; the best by potential is kept.
    pub local_trials: usize,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self::classic()
    }
}

impl SeedParams {
    /// One candidate per round.
    pub fn classic() -> Self {
        Self { local_trials: 1 }
    }

    /// `2 + ⌊ln k⌋` candidates per round.
    pub fn greedy(k: usize) -> Self {
        let extra = (k.max(1) as f64).ln().floor() as usize;
        Self {
            local_trials: 2 + extra,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.local_trials == 0 {
            return Err(Error::InvalidParameter {
                name: "local_trials",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// k-means++ selection; returns `k` distinct row indices in pick order.
pub(crate) fn kmeans_pp<T: Scalar>(
    pool: &WorkerPool,
    data: Rows<'_, T>,
    k: usize,
    metric: Metric<T>,
    seed: u64,
    params: SeedParams,
) -> Result<Vec<usize>> {
    let n = data.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    let mut is_chosen = vec![false; n];

    let first = rng.random_range(0..n);
    log::trace!("kmeans++: center 0 <- row {first}");
    chosen.push(first);
    is_chosen[first] = true;

    let mut weights = vec![f64::INFINITY; n];
    fold_center(pool, data, metric, &mut weights, first);

    while chosen.len() < k {
        let total: f64 = weights.iter().sum();
        if !total.is_finite() {
            return Err(Error::NonFinite {
                what: "sampling weights",
            });
        }
        let pick = if total > 0.0 {
            if params.local_trials <= 1 {
                sample_weighted(&mut rng, &weights, total)
            } else {
                let trials = params.local_trials;
                best_of_trials(pool, data, metric, &mut rng, &weights, total, trials)
            }
        } else {
            None
        };

        let next = match pick {
            Some(i) => i,
            None => {
                log::warn!(
                    "kmeans++: all sampling weights are zero after {} centers; drawing uniformly",
                    chosen.len()
                );
                let remaining: Vec<usize> = (0..n).filter(|&i| !is_chosen[i]).collect();
                remaining[rng.random_range(0..remaining.len())]
            }
        };

        log::trace!("kmeans++: center {} <- row {next}", chosen.len());
        chosen.push(next);
        is_chosen[next] = true;
        fold_center(pool, data, metric, &mut weights, next);
    }

    Ok(chosen)
}

/// `weights[i] = min(weights[i], d(x_i, x_center)²)`, and zero for the center itself.
fn fold_center<T: Scalar>(
    pool: &WorkerPool,
    data: Rows<'_, T>,
    metric: Metric<T>,
    weights: &mut [f64],
    center: usize,
) {
    let c = data.row(center);
    pool.for_each_chunk_mut(weights, |start, chunk| {
        for (j, w) in chunk.iter_mut().enumerate() {
            let d = metric.squared_distance(data.row(start + j), c);
            if d < *w {
                *w = d;
            }
        }
    });
    // Some metrics (minrmsd) are only approximately zero on identical rows.
    weights[center] = 0.0;
}

/// Draw an index with probability `w_i / total`; zero-weight entries are never drawn.
fn sample_weighted(rng: &mut StdRng, weights: &[f64], total: f64) -> Option<usize> {
    let threshold = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last = Some(i);
        if cumulative > threshold {
            return Some(i);
        }
    }
    // Rounding can leave the threshold just above the final cumulative sum.
    last
}

fn best_of_trials<T: Scalar>(
    pool: &WorkerPool,
    data: Rows<'_, T>,
    metric: Metric<T>,
    rng: &mut StdRng,
    weights: &[f64],
    total: f64,
    trials: usize,
) -> Option<usize> {
    let candidates: Vec<usize> = (0..trials)
        .filter_map(|_| sample_weighted(rng, weights, total))
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for &cand in &candidates {
        let c = data.row(cand);
        // Summed in point order so the winner does not depend on the chunking.
        let potential: f64 = pool
            .map_chunks(data.len(), |range| {
                range
                    .map(|i| weights[i].min(metric.squared_distance(data.row(i), c)))
                    .collect::<Vec<f64>>()
            })
            .into_iter()
            .flatten()
            .sum();
        match best {
            Some((_, p)) if p <= potential => {}
            _ => best = Some((cand, potential)),
        }
    }
    best.map(|(cand, _)| cand)
}

/// `k` distinct indices drawn uniformly without replacement.
pub(crate) fn uniform(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, n, k).into_vec()
}

/// Copy the selected rows into a new row-major buffer.
pub(crate) fn gather<T: Scalar>(data: Rows<'_, T>, indices: &[usize]) -> Vec<T> {
    let mut out = Vec::with_capacity(indices.len() * data.dim());
    for &i in indices {
        out.extend_from_slice(data.row(i));
    }
    out
}
