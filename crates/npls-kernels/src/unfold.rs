//! Column-major (Fortran-order) unfolding and refolding
//!
//! N-way PLS works on matricized arrays: the sample mode becomes the rows and
//! all remaining modes are flattened into the columns with the *first* index
//! varying fastest. Every Kronecker product in the model is built to match
//! this order (last mode first), so unfold and refold must use exactly the
//! same linearization.
//!
//! Arrays themselves stay in the standard (row-major) memory layout; only the
//! index arithmetic is column-major.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array, Array2, ArrayD, ArrayView, Dimension, IxDyn};

/// Flatten an array in column-major order.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::fortran_flatten;
///
/// let m = array![[1.0, 2.0], [3.0, 4.0]];
/// assert_eq!(fortran_flatten(&m.view()), vec![1.0, 3.0, 2.0, 4.0]);
/// ```
pub fn fortran_flatten<T: Clone, D: Dimension>(a: &ArrayView<'_, T, D>) -> Vec<T> {
    // Reversing the axes turns logical row-major traversal into column-major.
    a.t().iter().cloned().collect()
}

/// Column-major linear offset of a multi-index.
pub fn fortran_offset(index: &[usize], shape: &[usize]) -> usize {
    let mut offset = 0;
    let mut stride = 1;
    for (&i, &dim) in index.iter().zip(shape.iter()) {
        offset += i * stride;
        stride *= dim;
    }
    offset
}

/// Multi-index of a column-major linear offset.
pub fn fortran_multi_index(mut offset: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = Vec::with_capacity(shape.len());
    for &dim in shape {
        index.push(offset % dim);
        offset /= dim;
    }
    index
}

/// Build an array of the given shape from column-major data.
///
/// # Errors
///
/// Returns an error if the element count does not match the shape.
pub fn refold<T: Clone>(data: &[T], shape: &[usize]) -> KernelResult<ArrayD<T>> {
    let total: usize = shape.iter().product();
    if data.len() != total {
        return Err(KernelError::incompatible_shapes(
            "refold",
            vec![data.len()],
            shape.to_vec(),
            "element count differs from the target shape",
        ));
    }

    let ndim = shape.len();
    Ok(Array::from_shape_fn(IxDyn(shape), |idx| {
        let mut offset = 0;
        let mut stride = 1;
        for d in 0..ndim {
            offset += idx[d] * stride;
            stride *= shape[d];
        }
        data[offset].clone()
    }))
}

/// Reshape an array to a new shape using column-major order on both sides.
pub fn reshape_fortran<T: Clone, D: Dimension>(
    a: &ArrayView<'_, T, D>,
    shape: &[usize],
) -> KernelResult<ArrayD<T>> {
    refold(&fortran_flatten(a), shape)
}

/// Build a matrix from column-major data.
pub fn matrix_from_fortran<T: Clone>(
    data: &[T],
    rows: usize,
    cols: usize,
) -> KernelResult<Array2<T>> {
    if data.len() != rows * cols {
        return Err(KernelError::incompatible_shapes(
            "matrix_from_fortran",
            vec![data.len()],
            vec![rows, cols],
            "element count differs from the target shape",
        ));
    }
    Ok(Array2::from_shape_fn((rows, cols), |(i, j)| {
        data[i + rows * j].clone()
    }))
}

/// Unfold an array to `(I, J1*J2*...*Jp)` with the first axis as rows.
///
/// A one-dimensional array is treated as a single column.
///
/// # Errors
///
/// Returns an error for zero-dimensional input.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, IxDyn};
/// use npls_kernels::unfold_samples;
///
/// let x = Array::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| (idx[0] + 10 * idx[1] + 100 * idx[2]) as f64);
/// let m = unfold_samples(&x).unwrap();
/// assert_eq!(m.shape(), &[2, 12]);
/// // column j = j1 + 3 * j2
/// assert_eq!(m[[1, 5]], 1.0 + 20.0 + 100.0);
/// ```
pub fn unfold_samples<T: Clone>(a: &ArrayD<T>) -> KernelResult<Array2<T>> {
    let shape = a.shape();
    if shape.is_empty() {
        return Err(KernelError::empty_input("unfold_samples", "shape"));
    }

    let rows = shape[0];
    let cols: usize = shape[1..].iter().product();
    matrix_from_fortran(&fortran_flatten(&a.view()), rows, cols)
}

/// Fold a sample-mode unfolding back to its native shape.
pub fn fold_samples<T: Clone>(m: &Array2<T>, shape: &[usize]) -> KernelResult<ArrayD<T>> {
    let expected_cols: usize = shape.iter().skip(1).product();
    if shape.is_empty() || m.nrows() != shape[0] || m.ncols() != expected_cols {
        return Err(KernelError::incompatible_shapes(
            "fold_samples",
            m.shape().to_vec(),
            shape.to_vec(),
            "matrix is not the sample-mode unfolding of the target shape",
        ));
    }
    refold(&fortran_flatten(&m.view()), shape)
}

/// Mode-n unfolding: mode `mode` as rows, remaining modes column-major.
///
/// # Errors
///
/// Returns an error if `mode` is out of bounds.
pub fn unfold_mode<T: Clone>(a: &ArrayD<T>, mode: usize) -> KernelResult<Array2<T>> {
    let shape = a.shape();
    if mode >= shape.len() {
        return Err(KernelError::invalid_mode(
            mode,
            shape.len(),
            "unfold_mode requires an existing mode",
        ));
    }

    let rest: Vec<usize> = shape
        .iter()
        .enumerate()
        .filter(|&(d, _)| d != mode)
        .map(|(_, &s)| s)
        .collect();
    let cols: usize = rest.iter().product();

    Ok(Array2::from_shape_fn((shape[mode], cols), |(row, col)| {
        let mut index = fortran_multi_index(col, &rest);
        index.insert(mode, row);
        a[&index[..]].clone()
    }))
}

/// Inverse of [`unfold_mode`]: fold a mode-n unfolding back to `shape`.
///
/// # Errors
///
/// Returns an error if `mode` is out of bounds or the matrix is not the
/// mode-`mode` unfolding of `shape`.
pub fn fold_mode<T: Clone>(m: &Array2<T>, mode: usize, shape: &[usize]) -> KernelResult<ArrayD<T>> {
    if mode >= shape.len() {
        return Err(KernelError::invalid_mode(
            mode,
            shape.len(),
            "fold_mode requires an existing mode",
        ));
    }

    let rest: Vec<usize> = shape
        .iter()
        .enumerate()
        .filter(|&(d, _)| d != mode)
        .map(|(_, &s)| s)
        .collect();
    let cols: usize = rest.iter().product();
    if m.nrows() != shape[mode] || m.ncols() != cols {
        return Err(KernelError::incompatible_shapes(
            "fold_mode",
            m.shape().to_vec(),
            shape.to_vec(),
            "matrix is not the mode unfolding of the target shape",
        ));
    }

    Ok(Array::from_shape_fn(IxDyn(shape), |idx| {
        let mut col = 0;
        let mut stride = 1;
        for d in (0..shape.len()).filter(|&d| d != mode) {
            col += idx[d] * stride;
            stride *= shape[d];
        }
        m[[idx[mode], col]].clone()
    }))
}
