//! Outer products of per-mode factor matrices
//!
//! Given factor matrices `F_0, ..., F_{n-1}` (each `dim_i × R`), component
//! `r` contributes the outer product `F_0[:,r] ∘ F_1[:,r] ∘ ...`. The
//! vectorized form stacks the column-major flattening of each component's
//! outer product as a column; the folded form sums the components and
//! refolds to `(dim_0, dim_1, ...)`.
//!
//! One mode can be left out of the product. N-way PLS uses the vectorized
//! form of the X loadings to map the inner regression back onto the
//! predictor variables.

use crate::error::{KernelError, KernelResult};
use crate::unfold::refold;
use scirs2_core::ndarray_ext::{Array2, ArrayD, ArrayView2};
use scirs2_core::numeric::Float;

/// Validate the factors and return `(included mode indices, components)`.
fn included_modes<T>(
    operation: &str,
    factors: &[ArrayView2<T>],
    leave_out: Option<usize>,
) -> KernelResult<(Vec<usize>, usize)> {
    let first = factors
        .first()
        .ok_or_else(|| KernelError::empty_input(operation, "factors"))?;
    let n_components = first.ncols();

    for (i, factor) in factors.iter().enumerate() {
        if factor.ncols() != n_components {
            return Err(KernelError::component_mismatch(
                operation,
                n_components,
                factor.ncols(),
                i,
            ));
        }
    }

    if let Some(mode) = leave_out {
        if mode >= factors.len() {
            return Err(KernelError::invalid_mode(
                mode,
                factors.len(),
                "leave-out mode must index one of the factors",
            ));
        }
    }

    let included: Vec<usize> = (0..factors.len())
        .filter(|&i| Some(i) != leave_out)
        .collect();
    if included.is_empty() {
        return Err(KernelError::empty_input(operation, "included modes"));
    }

    Ok((included, n_components))
}

/// Per-component outer products, vectorized column-major.
///
/// Returns a `(∏ dim_i) × R` matrix over the included modes. `leave_out` is
/// the zero-based index of a mode to exclude, if any.
///
/// # Errors
///
/// Returns an error if no factor is given, the factors disagree on their
/// number of components, or `leave_out` is out of range.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::outer_modes_vectorized;
///
/// let a = array![[1.0], [2.0]];
/// let b = array![[3.0], [4.0], [5.0]];
/// let v = outer_modes_vectorized(&[a.view(), b.view()], None).unwrap();
/// assert_eq!(v.shape(), &[6, 1]);
/// // row i + 2*j holds a[i] * b[j]
/// assert_eq!(v.column(0).to_vec(), vec![3.0, 6.0, 4.0, 8.0, 5.0, 10.0]);
/// ```
pub fn outer_modes_vectorized<T: Float>(
    factors: &[ArrayView2<T>],
    leave_out: Option<usize>,
) -> KernelResult<Array2<T>> {
    let (included, n_components) = included_modes("outer_modes_vectorized", factors, leave_out)?;
    let rows: usize = included.iter().map(|&i| factors[i].nrows()).product();

    let mut result = Array2::<T>::zeros((rows, n_components));
    for r in 0..n_components {
        let mut acc: Vec<T> = factors[included[0]].column(r).to_vec();
        for &mode in &included[1..] {
            // outer product with the next mode, flattened column-major
            let next = factors[mode].column(r);
            let mut grown = Vec::with_capacity(acc.len() * next.len());
            for &b in next.iter() {
                grown.extend(acc.iter().map(|&a| a * b));
            }
            acc = grown;
        }
        for (dst, src) in result.column_mut(r).iter_mut().zip(acc) {
            *dst = src;
        }
    }

    Ok(result)
}

/// Sum of the per-component outer products, refolded to the included
/// modes' dimensions.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::outer_modes;
///
/// let a = array![[1.0, 1.0], [2.0, 0.0]];
/// let b = array![[3.0, 1.0], [4.0, 1.0]];
/// let t = outer_modes(&[a.view(), b.view()], None).unwrap();
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t[[0, 0]], 3.0 + 1.0);
/// assert_eq!(t[[1, 1]], 8.0);
/// ```
pub fn outer_modes<T: Float>(
    factors: &[ArrayView2<T>],
    leave_out: Option<usize>,
) -> KernelResult<ArrayD<T>> {
    let vectorized = outer_modes_vectorized(factors, leave_out)?;
    let shape: Vec<usize> = factors
        .iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != leave_out)
        .map(|(_, f)| f.nrows())
        .collect();

    let summed: Vec<T> = vectorized
        .rows()
        .into_iter()
        .map(|row| row.iter().fold(T::zero(), |acc, &x| acc + x))
        .collect();

    refold(&summed, &shape)
}
