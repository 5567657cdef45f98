use super::scalar::Scalar;
use crate::error::{Error, Result};
use ndarray::{ArrayView2, CowArray, Ix2};

/// A contiguous row-major buffer viewed as `len()` rows of width `dim`.
#[derive(Debug)]
pub(crate) struct Rows<'a, T> {
    values: &'a [T],
    dim: usize,
}

impl<T> Clone for Rows<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Rows<'_, T> {}

impl<'a, T> Rows<'a, T> {
    pub(crate) fn new(values: &'a [T], dim: usize) -> Self {
        debug_assert!(dim > 0 && values.len() % dim == 0);
        Self { values, dim }
    }

    #[inline]
    pub(crate) fn row(&self, i: usize) -> &'a [T] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    #[inline]
    pub(crate) fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) fn as_slice(&self) -> &'a [T] {
        self.values
    }
}

/// A matrix normalised to standard (C) layout, borrowed when it already is.
pub(crate) struct Contiguous<'a, T> {
    array: CowArray<'a, T, Ix2>,
}

impl<'a, T: Scalar> Contiguous<'a, T> {
    pub(crate) fn new(view: ArrayView2<'a, T>) -> Self {
        let array = if view.is_standard_layout() {
            CowArray::from(view)
        } else {
            CowArray::from(view.as_standard_layout().into_owned())
        };
        Self { array }
    }

    pub(crate) fn rows(&self) -> Rows<'_, T> {
        // `new` left the array in standard layout, so the slice always exists.
        let values = self.array.as_slice().unwrap_or(&[]);
        Rows::new(values, self.array.ncols().max(1))
    }

    pub(crate) fn nrows(&self) -> usize {
        self.array.nrows()
    }
}

pub(crate) fn ensure_finite<T: Scalar>(what: &'static str, values: &[T]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::NonFinite { what })
    }
}

/// Flatten `&[Vec<T>]` into a row-major buffer, checking every row has `dim` entries.
pub(crate) fn flatten_rows<T: Scalar>(data: &[Vec<T>]) -> Result<(Vec<T>, usize)> {
    let first = data.first().ok_or(Error::EmptyInput)?;
    let dim = first.len();
    if dim == 0 {
        return Err(Error::EmptyInput);
    }
    let mut flat: Vec<T> = Vec::with_capacity(data.len() * dim);
    for point in data {
        if point.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: point.len(),
            });
        }
        flat.extend_from_slice(point);
    }
    Ok((flat, dim))
}
