use thiserror::Error;

/// Errors returned by the k-means engine.
///
/// Every variant is raised before any parallel work starts; a failed call
/// never leaves a partially updated result behind.
#[derive(Debug, Error)]
pub enum Error {
    /// Data matrix has no rows or no columns.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Metric name outside the supported set.
    #[error("unknown metric {0:?} (expected one of: euclidean, sqeuclidean, minrmsd)")]
    UnknownMetric(String),

    /// Row width does not match the configured dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// Row count does not match what the session was configured for.
    #[error("shape mismatch for {what}: expected {expected} rows, found {found}")]
    ShapeMismatch {
        /// Which matrix was rejected.
        what: &'static str,
        /// Expected row count.
        expected: usize,
        /// Found row count.
        found: usize,
    },

    /// Input contains NaN or infinite coordinates.
    #[error("{what} contains non-finite values")]
    NonFinite {
        /// Which matrix was rejected.
        what: &'static str,
    },

    /// Worker pool could not be started.
    #[error("thread pool: {0}")]
    ThreadPool(String),

    /// Buffer could not be viewed as a matrix.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
