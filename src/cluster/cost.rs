//! Distortion of a fixed data / center pair.
//!
//! ```text
//! cost = Σ_i min_c squared(metric(x_i, μ_c))
//! ```
//!
//! Read-only: the nearest center is found per point and discarded. Chunk
//! partial sums are added in chunk order, like the assignment kernel.

use super::assign::nearest;
use super::metric::Metric;
use super::parallel::WorkerPool;
use super::scalar::Scalar;
use super::util::Rows;

pub(crate) fn distortion<T: Scalar>(
    pool: &WorkerPool,
    data: Rows<'_, T>,
    centers: Rows<'_, T>,
    metric: Metric<T>,
) -> f64 {
    pool.map_chunks(data.len(), |range| {
        range
            .map(|i| {
                let (_, dist) = nearest(data.row(i), centers, metric);
                metric.kind.squared(dist)
            })
            .sum::<f64>()
    })
    .into_iter()
    .sum()
}
