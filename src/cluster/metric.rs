//! Distance metrics.
//!
//! The engine supports a small, closed set of metrics. A session resolves its
//! [`MetricKind`] once into a plain function pointer ([`DistanceFn`]) so the
//! N x K inner loop never branches on the metric. Kernels widen every term to
//! `f64`, so finite `f32` rows never overflow.
//!
//! | name          | distance                                   |
//! |---------------|--------------------------------------------|
//! | `euclidean`   | `sqrt(Σ (a_i - b_i)²)`                     |
//! | `sqeuclidean` | `Σ (a_i - b_i)²`                           |
//! | `minrmsd`     | RMSD after optimal superposition (xyz)     |
//!
//! ## Squared convention
//!
//! K-means scores a partition with *squared* distances, and k-means++ samples
//! with probability proportional to the squared distance. [`MetricKind::squared`]
//! is the one place that convention lives: `d²` for every metric except
//! `sqeuclidean`, whose distance is already squared. Only metrics for which
//! the coordinate-wise mean is a sensible center are offered.
//!
//! ## minRMSD
//!
//! Rows are molecular conformations: `D / 3` atoms with interleaved `x, y, z`
//! coordinates. The distance is the root-mean-square deviation after removing
//! translation (centering both conformations) and rotation. The optimal
//! rotation comes from the quaternion formulation (Horn, 1987): the largest
//! eigenvalue `λ` of a symmetric 4x4 key matrix built from the cross-covariance
//! gives `E = G_a + G_b - 2λ`, and `rmsd = sqrt(E / n_atoms)`.

use super::scalar::Scalar;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A distance kernel over two equal-length rows.
pub type DistanceFn<T> = fn(&[T], &[T]) -> f64;

/// Named distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetricKind {
    /// L2 distance.
    #[default]
    Euclidean,
    /// Squared L2 distance.
    SqEuclidean,
    /// Minimal RMSD between two 3-D conformations.
    MinRmsd,
}

impl MetricKind {
    /// All supported metrics.
    pub const ALL: [MetricKind; 3] = [
        MetricKind::Euclidean,
        MetricKind::SqEuclidean,
        MetricKind::MinRmsd,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Euclidean => "euclidean",
            MetricKind::SqEuclidean => "sqeuclidean",
            MetricKind::MinRmsd => "minrmsd",
        }
    }

    /// Resolve to the distance kernel for element type `T`.
    pub fn resolve<T: Scalar>(self) -> DistanceFn<T> {
        match self {
            MetricKind::Euclidean => euclidean::<T>,
            MetricKind::SqEuclidean => squared_euclidean::<T>,
            MetricKind::MinRmsd => min_rmsd::<T>,
        }
    }

    /// Apply the squared-distance convention used by the cost and by seeding.
    #[inline]
    pub fn squared(self, distance: f64) -> f64 {
        match self {
            MetricKind::SqEuclidean => distance,
            _ => distance * distance,
        }
    }

    /// Check that rows of width `dimension` are valid inputs for this metric.
    pub fn check_dimension(self, dimension: usize) -> Result<()> {
        if dimension == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "must be at least 1",
            });
        }
        if self == MetricKind::MinRmsd && dimension % 3 != 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "minrmsd needs a multiple of 3 (x, y, z per atom)",
            });
        }
        Ok(())
    }
}

/// A metric resolved for one element type: the kernel plus its name.
pub(crate) struct Metric<T> {
    pub(crate) kind: MetricKind,
    distance: DistanceFn<T>,
}

impl<T> Clone for Metric<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Metric<T> {}

impl<T: Scalar> Metric<T> {
    pub(crate) fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            distance: kind.resolve::<T>(),
        }
    }

    #[inline]
    pub(crate) fn distance(&self, a: &[T], b: &[T]) -> f64 {
        (self.distance)(a, b)
    }

    /// Squared distance (see [`MetricKind::squared`]).
    #[inline]
    pub(crate) fn squared_distance(&self, a: &[T], b: &[T]) -> f64 {
        self.kind.squared(self.distance(a, b))
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(MetricKind::Euclidean),
            "sqeuclidean" | "squared_euclidean" => Ok(MetricKind::SqEuclidean),
            "minrmsd" => Ok(MetricKind::MinRmsd),
            _ => Err(Error::UnknownMetric(s.to_string())),
        }
    }
}

impl TryFrom<String> for MetricKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MetricKind> for String {
    fn from(metric: MetricKind) -> Self {
        metric.name().to_string()
    }
}

#[inline]
pub(crate) fn squared_euclidean<T: Scalar>(a: &[T], b: &[T]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).fold(0.0, |acc, (&x, &y)| {
        let d = x.widen() - y.widen();
        acc + d * d
    })
}

#[inline]
fn euclidean<T: Scalar>(a: &[T], b: &[T]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

fn min_rmsd<T: Scalar>(a: &[T], b: &[T]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n_atoms = a.len() / 3;
    if n_atoms == 0 {
        return 0.0;
    }

    let ca = centroid3(a, n_atoms);
    let cb = centroid3(b, n_atoms);

    // Inner products of the centered conformations and their cross-covariance.
    let mut ga = 0.0f64;
    let mut gb = 0.0f64;
    let mut r = [[0.0f64; 3]; 3];
    for atom in 0..n_atoms {
        let mut xa = [0.0f64; 3];
        let mut xb = [0.0f64; 3];
        for c in 0..3 {
            xa[c] = a[3 * atom + c].widen() - ca[c];
            xb[c] = b[3 * atom + c].widen() - cb[c];
        }
        for i in 0..3 {
            ga += xa[i] * xa[i];
            gb += xb[i] * xb[i];
            for j in 0..3 {
                r[i][j] += xa[i] * xb[j];
            }
        }
    }

    let [[sxx, sxy, sxz], [syx, syy, syz], [szx, szy, szz]] = r;
    let key = [
        [sxx + syy + szz, syz - szy, szx - sxz, sxy - syx],
        [syz - szy, sxx - syy - szz, sxy + syx, szx + sxz],
        [szx - sxz, sxy + syx, -sxx + syy - szz, syz + szy],
        [sxy - syx, szx + sxz, syz + szy, -sxx - syy + szz],
    ];
    let lambda = largest_eigenvalue(key);

    let msd = ((ga + gb - 2.0 * lambda) / n_atoms as f64).max(0.0);
    msd.sqrt()
}

fn centroid3<T: Scalar>(x: &[T], n_atoms: usize) -> [f64; 3] {
    let mut c = [0.0f64; 3];
    for atom in 0..n_atoms {
        for (k, ck) in c.iter_mut().enumerate() {
            *ck += x[3 * atom + k].widen();
        }
    }
    let n = n_atoms as f64;
    c.map(|v| v / n)
}

/// Largest eigenvalue of a symmetric 4x4 matrix (cyclic Jacobi rotations).
fn largest_eigenvalue(mut m: [[f64; 4]; 4]) -> f64 {
    const MAX_SWEEPS: usize = 50;

    let scale: f64 = m.iter().flatten().map(|v| v * v).sum();
    if scale == 0.0 {
        return 0.0;
    }

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..3 {
            for q in (p + 1)..4 {
                off += m[p][q] * m[p][q];
            }
        }
        if off <= scale * 1e-30 {
            break;
        }

        for p in 0..3 {
            for q in (p + 1)..4 {
                let apq = m[p][q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (m[q][q] - m[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in m.iter_mut() {
                    let (kp, kq) = (row[p], row[q]);
                    row[p] = c * kp - s * kq;
                    row[q] = s * kp + c * kq;
                }
                for k in 0..4 {
                    let (pk, qk) = (m[p][k], m[q][k]);
                    m[p][k] = c * pk - s * qk;
                    m[q][k] = s * pk + c * qk;
                }
            }
        }
    }

    (0..4).map(|i| m[i][i]).fold(f64::NEG_INFINITY, f64::max)
}
