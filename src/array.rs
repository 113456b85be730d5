//! Numeric Arrays - Coercion and min-max scaling
//!
//! The backend turns any detected array capability into a dense
//! `ArrayD<f64>`. Scaling to 8-bit happens afterwards and is independent of
//! the backend.

use ndarray::{Array2, ArrayD, ArrayViewD, IxDyn};

use crate::error::ImageError;
use crate::source::{ArrayLike, Nested, SparseLike};

/// What the normalizer hands to the backend.
pub enum ArrayInput<'a> {
    Nested(&'a Nested),
    View(ArrayViewD<'a, f64>),
    Dense(ArrayD<f64>),
}

/// Numeric-array collaborator.
pub trait ArrayBackend {
    fn to_array(&self, input: ArrayInput<'_>) -> Result<ArrayD<f64>, ImageError>;
}

/// Default backend built on `ndarray`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdArrayBackend;

impl ArrayBackend for NdArrayBackend {
    fn to_array(&self, input: ArrayInput<'_>) -> Result<ArrayD<f64>, ImageError> {
        match input {
            ArrayInput::Nested(nested) => nested_to_array(nested),
            ArrayInput::View(view) => Ok(view.to_owned()),
            ArrayInput::Dense(array) => Ok(array),
        }
    }
}

fn nested_to_array(nested: &Nested) -> Result<ArrayD<f64>, ImageError> {
    let shape = infer_shape(nested);
    let mut data = Vec::new();
    flatten(nested, &shape, 0, &mut data)?;
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

/// Shape as seen along the first element of every level. Only a guess until
/// `flatten` has checked every item against it.
fn infer_shape(nested: &Nested) -> Vec<usize> {
    let mut shape = vec![];
    let mut current = nested;
    while let Nested::List(items) = current {
        shape.push(items.len());
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    shape
}

fn flatten(
    nested: &Nested,
    shape: &[usize],
    depth: usize,
    out: &mut Vec<f64>,
) -> Result<(), ImageError> {
    match nested {
        Nested::Scalar(v) if depth == shape.len() => {
            out.push(*v);
            Ok(())
        }
        Nested::List(items) if depth < shape.len() && items.len() == shape[depth] => {
            for item in items {
                flatten(item, shape, depth + 1, out)?;
            }
            Ok(())
        }
        _ => Err(ImageError::InvalidArray(format!(
            "ragged nested sequence at depth {}",
            depth
        ))),
    }
}

/// Min-max scale a grid into `0..=255`.
///
/// NaN cells are skipped for the min/max and map to 0. A grid with no
/// finite, non-zero range (constant, empty, all-NaN, or holding infinities)
/// produces all zeros.
pub fn min_max_scale(grid: &ArrayD<f64>) -> ArrayD<u8> {
    let (min, max) = grid
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    // max - min overflows for finite extremes; halving both ends cannot.
    let scale = if (max - min).is_finite() { 1.0 } else { 0.5 };
    let (low, range) = (min * scale, max * scale - min * scale);

    if !(range.is_finite() && range > 0.0) {
        log::warn!(
            "array has no usable value range (min={}, max={}); rendering all zeros",
            min,
            max
        );
        return ArrayD::zeros(grid.raw_dim());
    }

    grid.mapv(|v| {
        if v.is_nan() {
            0
        } else {
            ((v * scale - low) / range * 255.0) as u8
        }
    })
}

/// Sparse matrix in coordinate form. Duplicate coordinates are summed.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        entries: Vec<(usize, usize, f64)>,
    ) -> Result<Self, ImageError> {
        if let Some(&(r, c, _)) = entries.iter().find(|(r, c, _)| *r >= rows || *c >= cols) {
            return Err(ImageError::InvalidArray(format!(
                "entry ({}, {}) outside {}x{} matrix",
                r, c, rows, cols
            )));
        }
        Ok(Self { rows, cols, entries })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

impl SparseLike for SparseMatrix {
    fn to_dense(&self) -> ArrayD<f64> {
        let mut dense = Array2::<f64>::zeros((self.rows, self.cols));
        for &(r, c, v) in &self.entries {
            dense[[r, c]] += v;
        }
        dense.into_dyn()
    }
}

impl ArrayLike for SparseMatrix {
    fn type_name(&self) -> &str {
        "SparseMatrix"
    }

    fn as_sparse(&self) -> Option<&dyn SparseLike> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_to_array_shape() {
        let nested = Nested::from(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let arr = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap();
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 2]], 6.0);
    }

    #[test]
    fn test_ragged_nested_rejected() {
        let nested = Nested::List(vec![
            Nested::from(vec![1.0, 2.0]),
            Nested::from(vec![3.0]),
        ]);
        let err = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap_err();
        assert!(matches!(err, ImageError::InvalidArray(_)));
    }

    #[test]
    fn test_min_max_scale_spans_full_range() {
        let nested = Nested::from(vec![vec![-1.0, 0.0], vec![0.5, 1.0]]);
        let arr = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap();
        let scaled = min_max_scale(&arr);
        assert_eq!(scaled[[0, 0]], 0);
        assert_eq!(scaled[[1, 1]], 255);
        assert_eq!(scaled[[0, 1]], 127);
    }

    #[test]
    fn test_ragged_with_oversized_first_row() {
        let deep = Nested::List(vec![Nested::from(vec![0.0; 20_000]); 1]);
        let mut outer = vec![deep];
        outer.extend(std::iter::repeat(Nested::Scalar(1.0)).take(19_999));
        let mut top = vec![Nested::List(outer)];
        top.extend(std::iter::repeat(Nested::Scalar(2.0)).take(19_999));

        let err = NdArrayBackend
            .to_array(ArrayInput::Nested(&Nested::List(top)))
            .unwrap_err();
        assert!(matches!(err, ImageError::InvalidArray(_)));
    }

    #[test]
    fn test_extreme_finite_values_span_full_range() {
        let nested = Nested::from(vec![vec![-1e308, 0.0, 1e308]]);
        let arr = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap();
        let scaled = min_max_scale(&arr);
        assert_eq!(scaled.iter().copied().collect::<Vec<_>>(), vec![0, 127, 255]);
    }

    #[test]
    fn test_infinite_values_zero_filled() {
        let nested = Nested::from(vec![vec![f64::NEG_INFINITY, 0.0, 1.0]]);
        let arr = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap();
        assert!(min_max_scale(&arr).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_sparse_shape_and_nnz() {
        let m = SparseMatrix::from_triplets(3, 5, vec![(0, 0, 1.0), (2, 4, 1.0)]).unwrap();
        assert_eq!(m.shape(), (3, 5));
        assert_eq!(m.nnz(), 2);
    }

    #[test]
    fn test_constant_grid_is_zero_filled() {
        let nested = Nested::from(vec![vec![7.0, 7.0], vec![7.0, 7.0]]);
        let arr = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap();
        let scaled = min_max_scale(&arr);
        assert!(scaled.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_nan_cells_map_to_zero() {
        let nested = Nested::from(vec![vec![f64::NAN, 2.0], vec![4.0, 6.0]]);
        let arr = NdArrayBackend.to_array(ArrayInput::Nested(&nested)).unwrap();
        let scaled = min_max_scale(&arr);
        assert_eq!(scaled[[0, 0]], 0);
        assert_eq!(scaled[[1, 1]], 255);
    }

    #[test]
    fn test_sparse_duplicates_summed() {
        let m = SparseMatrix::from_triplets(2, 2, vec![(0, 1, 1.0), (0, 1, 2.0)]).unwrap();
        let dense = m.to_dense();
        assert_eq!(dense[[0, 1]], 3.0);
        assert_eq!(dense[[1, 1]], 0.0);
    }

    #[test]
    fn test_sparse_out_of_bounds() {
        let err = SparseMatrix::from_triplets(2, 2, vec![(2, 0, 1.0)]).unwrap_err();
        assert!(err.to_string().contains("outside 2x2"));
    }
}
