//! Assignment kernel and center update.
//!
//! One Lloyd pass: every point finds its nearest center (ties go to the lowest
//! center index), and is folded into a per-cluster coordinate sum and count.
//! Each chunk of points owns a private accumulator, so no locks are taken; the
//! accumulators are merged in chunk order once all workers are done.
//!
//! Sums are kept in `f64` for both element types, so large clusters do not
//! lose precision in single-precision runs.

use super::metric::Metric;
use super::parallel::WorkerPool;
use super::scalar::Scalar;
use super::util::Rows;

/// Merged output of one assignment pass.
#[derive(Debug, Clone)]
pub(crate) struct Accumulated {
    /// `k * d` coordinate sums, row-major.
    pub(crate) sums: Vec<f64>,
    /// Points per cluster.
    pub(crate) counts: Vec<usize>,
    /// Nearest center per point.
    pub(crate) labels: Vec<usize>,
    /// Sum of squared nearest-center distances.
    pub(crate) cost: f64,
}

impl Accumulated {
    fn zeros(k: usize, d: usize, n: usize) -> Self {
        Self {
            sums: vec![0.0; k * d],
            counts: vec![0; k],
            labels: Vec::with_capacity(n),
            cost: 0.0,
        }
    }

    fn merge(&mut self, other: Accumulated) {
        for (s, o) in self.sums.iter_mut().zip(other.sums) {
            *s += o;
        }
        for (c, o) in self.counts.iter_mut().zip(other.counts) {
            *c += o;
        }
        self.labels.extend(other.labels);
        self.cost += other.cost;
    }
}

/// Index of, and distance to, the nearest center. Ties resolve to the lowest index.
#[inline]
pub(crate) fn nearest<T: Scalar>(
    point: &[T],
    centers: Rows<'_, T>,
    metric: Metric<T>,
) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = metric.distance(point, centers.row(0));
    for c in 1..centers.len() {
        let dist = metric.distance(point, centers.row(c));
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    (best, best_dist)
}

/// Assign every point and accumulate per-cluster sums and counts.
pub(crate) fn accumulate<T: Scalar>(
    pool: &WorkerPool,
    data: Rows<'_, T>,
    centers: Rows<'_, T>,
    metric: Metric<T>,
) -> Accumulated {
    let (n, k, d) = (data.len(), centers.len(), data.dim());

    let partials = pool.map_chunks(n, |range| {
        let mut acc = Accumulated::zeros(k, d, range.len());
        for i in range {
            let point = data.row(i);
            let (c, dist) = nearest(point, centers, metric);
            let sum = &mut acc.sums[c * d..(c + 1) * d];
            for (s, &x) in sum.iter_mut().zip(point) {
                *s += x.widen();
            }
            acc.counts[c] += 1;
            acc.labels.push(c);
            acc.cost += metric.kind.squared(dist);
        }
        acc
    });

    let mut total = Accumulated::zeros(k, d, n);
    for partial in partials {
        total.merge(partial);
    }
    total
}

/// Means of the accumulated clusters; an empty cluster keeps its previous center.
pub(crate) fn update_centers<T: Scalar>(acc: &Accumulated, previous: Rows<'_, T>) -> Vec<T> {
    let d = previous.dim();
    let mut out: Vec<T> = Vec::with_capacity(previous.len() * d);
    for (c, &count) in acc.counts.iter().enumerate() {
        if count == 0 {
            out.extend_from_slice(previous.row(c));
        } else {
            let inv = 1.0 / count as f64;
            out.extend(acc.sums[c * d..(c + 1) * d].iter().map(|&s| T::narrow(s * inv)));
        }
    }
    out
}

/// Nearest-center labels only, without accumulation.
pub(crate) fn labels<T: Scalar>(
    pool: &WorkerPool,
    data: Rows<'_, T>,
    centers: Rows<'_, T>,
    metric: Metric<T>,
) -> Vec<usize> {
    pool.map_chunks(data.len(), |range| {
        range
            .map(|i| nearest(data.row(i), centers, metric).0)
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect()
}

/// Largest per-center movement between two center sets.
pub(crate) fn max_displacement<T: Scalar>(
    old: Rows<'_, T>,
    new: Rows<'_, T>,
    metric: Metric<T>,
) -> f64 {
    (0..old.len())
        .map(|c| metric.distance(old.row(c), new.row(c)))
        .fold(0.0, f64::max)
}
