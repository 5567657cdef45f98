//! Per-iteration progress reporting for the convergence loop.

use ndarray::ArrayView2;

/// Snapshot handed to a [`ProgressSink`] after every loop iteration.
#[derive(Debug, Clone)]
pub struct Progress<'a, T> {
    /// 1-based iteration that just finished.
    pub iteration: usize,
    /// Iteration budget of the running loop.
    pub max_iter: usize,
    /// Largest center movement in this iteration.
    pub displacement: f64,
    /// Distortion of the partition computed in this iteration.
    pub cost: f64,
    /// Centers after this iteration's update.
    pub centers: ArrayView2<'a, T>,
}

/// Receiver of loop progress.
///
/// Any `FnMut(&Progress<T>)` closure is a sink.
pub trait ProgressSink<T> {
    /// Called once per iteration, on the thread that runs the loop.
    fn on_iteration(&mut self, progress: &Progress<'_, T>);
}

impl<T, F> ProgressSink<T> for F
where
    F: FnMut(&Progress<'_, T>),
{
    fn on_iteration(&mut self, progress: &Progress<'_, T>) {
        self(progress)
    }
}
