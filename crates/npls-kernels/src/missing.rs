//! Missing-data aware summation and matrix products
//!
//! Missing elements are encoded as NaN. Sums skip them and are then
//! standardized for the lower number of contributing terms: a sum over `n`
//! nominal terms of which `k` are valid is reported as `n * sum_valid / k`.
//! This is a rescaling convention, not a mean. A slot with no valid term at
//! all is NaN.
//!
//! When nothing is missing every routine here agrees with its plain
//! counterpart (`sum`, `dot`).

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView, ArrayView1, ArrayView2, Dimension};
use scirs2_core::numeric::Float;

#[inline]
fn count_as<T: Float>(n: usize) -> T {
    T::from(n).unwrap_or_else(T::infinity)
}

/// Standardized sum of `len` nominal terms with `valid` present.
#[inline]
fn standardize<T: Float>(sum: T, len: usize, valid: usize) -> T {
    if valid == 0 {
        T::nan()
    } else if valid == len {
        sum
    } else {
        count_as::<T>(len) * sum / count_as::<T>(valid)
    }
}

/// Sum a vector ignoring NaN entries, rescaled to the nominal length.
///
/// Returns NaN when every entry is missing.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::miss_sum;
///
/// let v = array![1.0, f64::NAN, 3.0, 4.0];
/// // 4 nominal terms, 3 valid: 4 * 8 / 3
/// assert!((miss_sum(&v.view()) - 32.0 / 3.0).abs() < 1e-12);
/// ```
pub fn miss_sum<T: Float>(v: &ArrayView1<T>) -> T {
    let mut sum = T::zero();
    let mut valid = 0usize;
    for &x in v.iter() {
        if !x.is_nan() {
            sum = sum + x;
            valid += 1;
        }
    }
    standardize(sum, v.len(), valid)
}

/// Column sums of a matrix ignoring NaN entries.
///
/// Each column is rescaled by `nrows / valid_in_column`; a column with no
/// valid entry is NaN.
pub fn miss_sum_columns<T: Float>(x: &ArrayView2<T>) -> Array1<T> {
    Array1::from_iter(x.columns().into_iter().map(|col| miss_sum(&col)))
}

/// NaN-tolerant matrix product `A · B`.
///
/// Entry `(i, j)` is the standardized sum over `k` of `A[i,k] * B[k,j]`,
/// skipping products that are NaN. Rows and columns without any valid term
/// produce NaN in the result instead of an error.
///
/// # Errors
///
/// Returns an error if the inner dimensions differ.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::miss_mult;
///
/// let a = array![[1.0, 2.0], [3.0, f64::NAN]];
/// let b = array![[1.0], [1.0]];
/// let c = miss_mult(&a.view(), &b.view()).unwrap();
/// assert_eq!(c[[0, 0]], 3.0);
/// // one of two terms valid: 2 * 3 / 1
/// assert_eq!(c[[1, 0]], 6.0);
/// ```
pub fn miss_mult<T: Float>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> KernelResult<Array2<T>> {
    let (ia, ja) = a.dim();
    let (ib, jb) = b.dim();

    if ja != ib {
        return Err(KernelError::dimension_mismatch(
            "miss_mult",
            vec![ja],
            vec![ib],
            "Columns of A must equal rows of B",
        ));
    }

    let mut result = Array2::<T>::zeros((ia, jb));
    for j in 0..jb {
        let b_col = b.column(j);
        for i in 0..ia {
            let mut sum = T::zero();
            let mut valid = 0usize;
            for (&a_ik, &b_kj) in a.row(i).iter().zip(b_col.iter()) {
                let prod = a_ik * b_kj;
                if !prod.is_nan() {
                    sum = sum + prod;
                    valid += 1;
                }
            }
            result[[i, j]] = standardize(sum, ja, valid);
        }
    }

    Ok(result)
}

/// Check whether an array holds any missing (NaN) element.
pub fn has_missing<T: Float, D: Dimension>(a: &ArrayView<T, D>) -> bool {
    a.iter().any(|x| x.is_nan())
}

/// Sum of squares over the non-missing elements of an array.
pub fn masked_sum_squares<T: Float, D: Dimension>(a: &ArrayView<T, D>) -> T {
    a.iter()
        .filter(|x| !x.is_nan())
        .fold(T::zero(), |acc, &x| acc + x * x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_miss_sum_no_missing() {
        let v = array![1.0, 2.0, 3.0];
        assert_eq!(miss_sum(&v.view()), 6.0);
    }

    #[test]
    fn test_miss_sum_rescales_by_nominal_length() {
        let v = array![2.0, f64::NAN];
        // weight 2, one valid term
        assert_eq!(miss_sum(&v.view()), 4.0);
    }

    #[test]
    fn test_miss_sum_all_missing_is_nan() {
        let v = array![f64::NAN, f64::NAN];
        assert!(miss_sum(&v.view()).is_nan());
    }

    #[test]
    fn test_miss_sum_columns() {
        let x = array![[1.0, f64::NAN, 2.0], [3.0, f64::NAN, f64::NAN]];
        let s = miss_sum_columns(&x.view());

        assert_eq!(s.len(), 3);
        assert_eq!(s[0], 4.0);
        assert!(s[1].is_nan());
        assert_eq!(s[2], 4.0);
    }

    #[test]
    fn test_miss_mult_matches_dot_without_missing() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let b = array![[1.0, 0.5], [0.0, -1.0], [2.0, 1.0]];
        let c = miss_mult(&a.view(), &b.view()).unwrap();
        let expected = a.dot(&b);

        assert_eq!(c.shape(), &[2, 2]);
        for (x, y) in c.iter().zip(expected.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_miss_mult_fully_missing_row_is_nan() {
        let a = array![[f64::NAN, f64::NAN], [1.0, 1.0]];
        let b = array![[1.0], [2.0]];
        let c = miss_mult(&a.view(), &b.view()).unwrap();

        assert!(c[[0, 0]].is_nan());
        assert_eq!(c[[1, 0]], 3.0);
    }

    #[test]
    fn test_miss_mult_dimension_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((2, 2));
        assert!(miss_mult(&a.view(), &b.view()).is_err());
    }

    #[test]
    fn test_has_missing_and_masked_sum_squares() {
        let x = array![[1.0, f64::NAN], [2.0, 3.0]];
        assert!(has_missing(&x.view()));
        assert_eq!(masked_sum_squares(&x.view()), 14.0);

        let y = array![1.0, 2.0];
        assert!(!has_missing(&y.view()));
    }
}
