use crate::error::Result;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering<T = f32> {
    /// Fit the model (if needed) and return one cluster label per input point.
    fn fit_predict(&self, data: &[Vec<T>]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}
