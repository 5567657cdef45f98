//! Worker pools and contiguous chunk planning.
//!
//! Every parallel pass in the engine follows the same discipline: the point
//! range `0..n` is cut into at most `workers` contiguous chunks, each chunk is
//! processed by one task with private state, and the per-chunk results come
//! back **in chunk order** (rayon's indexed `collect` preserves it). Callers
//! then fold them sequentially, so floating-point merges are reproducible for a
//! given thread budget no matter which worker finished first.

use crate::error::{Error, Result};
use rayon::prelude::*;
use std::ops::Range;

/// A fixed-size pool owned by one engine invocation.
pub(crate) struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Build a pool with `threads` workers; `0` means all available cores.
    pub(crate) fn new(threads: usize) -> Result<Self> {
        let workers = if threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lloyd-worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        log::trace!("started worker pool with {workers} threads");
        Ok(Self { pool, workers })
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    /// Run `f` once per chunk of `0..n` and return the results in chunk order.
    pub(crate) fn map_chunks<R, F>(&self, n: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(Range<usize>) -> R + Sync,
    {
        let ranges = chunk_ranges(n, self.workers);
        self.pool
            .install(|| ranges.into_par_iter().map(&f).collect())
    }

    /// Run `f` over disjoint chunks of `values`; `f` receives the chunk's
    /// starting index and its mutable slice.
    pub(crate) fn for_each_chunk_mut<U, F>(&self, values: &mut [U], f: F)
    where
        U: Send,
        F: Fn(usize, &mut [U]) + Sync,
    {
        if values.is_empty() {
            return;
        }
        let size = chunk_len(values.len(), self.workers);
        self.pool.install(|| {
            values
                .par_chunks_mut(size)
                .enumerate()
                .for_each(|(c, chunk)| f(c * size, chunk));
        });
    }
}

fn chunk_len(n: usize, workers: usize) -> usize {
    n.div_ceil(workers.max(1)).max(1)
}

/// Split `0..n` into at most `workers` non-empty contiguous ranges.
pub(crate) fn chunk_ranges(n: usize, workers: usize) -> Vec<Range<usize>> {
    let size = chunk_len(n, workers);
    (0..n)
        .step_by(size)
        .map(|start| start..(start + size).min(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_everything_in_order() {
        for n in [0usize, 1, 2, 7, 100, 101] {
            for workers in [1usize, 2, 3, 8, 200] {
                let ranges = chunk_ranges(n, workers);
                assert!(ranges.len() <= workers);
                let flat: Vec<usize> = ranges.iter().cloned().flatten().collect();
                assert_eq!(flat, (0..n).collect::<Vec<_>>());
                assert!(ranges.iter().all(|r| !r.is_empty()));
            }
        }
    }

    #[test]
    fn map_chunks_keeps_chunk_order() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.workers(), 4);
        let starts = pool.map_chunks(10, |r| r.start);
        assert_eq!(starts, vec![0, 3, 6, 9]);
    }

    #[test]
    fn zero_threads_means_all_cores() {
        let pool = WorkerPool::new(0).unwrap();
        assert!(pool.workers() >= 1);
    }

    #[test]
    fn chunk_mut_sees_global_offsets() {
        let pool = WorkerPool::new(3).unwrap();
        let mut v = vec![0usize; 10];
        pool.for_each_chunk_mut(&mut v, |start, chunk| {
            for (i, x) in chunk.iter_mut().enumerate() {
                *x = start + i;
            }
        });
        assert_eq!(v, (0..10).collect::<Vec<_>>());
    }
}
