//! Kronecker products of mode loadings
//!
//! For matrices A (m×n) and B (p×q), `A ⊗ B` has size (mp×nq) with block
//! `(i, j)` equal to `a_ij * B`.
//!
//! The N-way PLS model combines per-mode loadings as
//! `W_last ⊗ ... ⊗ W_2 ⊗ W_1`, so that row `j1 + J1*j2 + ...` of the product
//! lines up with the column-major unfolding of the data. Reversing the order
//! produces a valid-looking but wrong model.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1, ArrayView2};
use scirs2_core::numeric::Num;

/// Compute the Kronecker product of two matrices
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::kronecker;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[5.0, 6.0], [7.0, 8.0]];
/// let c = kronecker(&a.view(), &b.view());
/// assert_eq!(c.shape(), &[4, 4]);
/// assert_eq!(c[[0, 2]], 10.0); // 2*5
/// assert_eq!(c[[3, 3]], 32.0); // 4*8
/// ```
pub fn kronecker<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num,
{
    let (m, n) = a.dim();
    let (p, q) = b.dim();

    let mut result = Array2::<T>::zeros((m * p, n * q));

    for ((i, j), a_val) in a.indexed_iter() {
        let block_row = i * p;
        let block_col = j * q;
        for ((bi, bj), b_val) in b.indexed_iter() {
            result[[block_row + bi, block_col + bj]] = a_val.clone() * b_val.clone();
        }
    }

    result
}

/// Kronecker product of two vectors: `out[i * len(b) + k] = a[i] * b[k]`.
pub fn kronecker_vectors<T>(a: &ArrayView1<T>, b: &ArrayView1<T>) -> Array1<T>
where
    T: Clone + Num,
{
    let p = b.len();
    Array1::from_shape_fn(a.len() * p, |idx| a[idx / p].clone() * b[idx % p].clone())
}

/// Combine per-mode loading vectors last mode first:
/// `v[n-1] ⊗ v[n-2] ⊗ ... ⊗ v[0]`.
///
/// # Errors
///
/// Returns an error if no vector is given.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_kernels::kronecker_modes_vectors;
///
/// let w1 = array![1.0, 2.0];
/// let w2 = array![10.0, 20.0, 30.0];
/// let k = kronecker_modes_vectors(&[w1.view(), w2.view()]).unwrap();
/// // index j1 + 2 * j2
/// assert_eq!(k.to_vec(), vec![10.0, 20.0, 20.0, 40.0, 30.0, 60.0]);
/// ```
pub fn kronecker_modes_vectors<T>(vectors: &[ArrayView1<T>]) -> KernelResult<Array1<T>>
where
    T: Clone + Num,
{
    let (last, rest) = vectors
        .split_last()
        .ok_or_else(|| KernelError::empty_input("kronecker_modes_vectors", "vectors"))?;

    let mut acc = last.to_owned();
    for v in rest.iter().rev() {
        acc = kronecker_vectors(&acc.view(), v);
    }
    Ok(acc)
}

/// Combine per-mode loading matrices last mode first:
/// `M[n-1] ⊗ M[n-2] ⊗ ... ⊗ M[0]`.
///
/// # Errors
///
/// Returns an error if no matrix is given.
pub fn kronecker_modes<T>(matrices: &[ArrayView2<T>]) -> KernelResult<Array2<T>>
where
    T: Clone + Num,
{
    let (last, rest) = matrices
        .split_last()
        .ok_or_else(|| KernelError::empty_input("kronecker_modes", "matrices"))?;

    let mut acc = last.to_owned();
    for m in rest.iter().rev() {
        acc = kronecker(&acc.view(), m);
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_kronecker_basic() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[0.0, 5.0], [6.0, 7.0]];
        let c = kronecker(&a.view(), &b.view());

        let expected = array![
            [0.0, 5.0, 0.0, 10.0],
            [6.0, 7.0, 12.0, 14.0],
            [0.0, 15.0, 0.0, 20.0],
            [18.0, 21.0, 24.0, 28.0]
        ];
        assert_eq!(c, expected);
    }

    #[test]
    fn test_kronecker_column_vectors() {
        let a = array![[1.0], [2.0]];
        let b = array![[3.0], [4.0], [5.0]];
        let c = kronecker(&a.view(), &b.view());
        let v = kronecker_vectors(&array![1.0, 2.0].view(), &array![3.0, 4.0, 5.0].view());

        assert_eq!(c.shape(), &[6, 1]);
        assert_eq!(c.column(0).to_vec(), v.to_vec());
    }

    #[test]
    fn test_kronecker_modes_order_matches_vectors() {
        let w1 = array![[1.0, 0.5], [2.0, -1.0]];
        let w2 = array![[3.0, 1.0], [4.0, 0.0], [5.0, 2.0]];
        let w3 = array![[1.0, 1.0], [-1.0, 3.0]];
        let k = kronecker_modes(&[w1.view(), w2.view(), w3.view()]).unwrap();
        assert_eq!(k.shape(), &[12, 8]);

        // The first column of W3 ⊗ W2 ⊗ W1 combines the first columns.
        let kv = kronecker_modes_vectors(&[w1.column(0), w2.column(0), w3.column(0)]).unwrap();
        assert_eq!(k.column(0).to_vec(), kv.to_vec());

        // Row j1 + 2*j2 + 6*j3
        assert_eq!(kv[1 + 2 * 2 + 6], 2.0 * 5.0 * -1.0);
    }

    #[test]
    fn test_kronecker_modes_single_and_empty() {
        let w = array![[1.0], [2.0]];
        let k = kronecker_modes(&[w.view()]).unwrap();
        assert_eq!(k, w);

        let empty: Vec<ArrayView2<f64>> = Vec::new();
        assert!(kronecker_modes(&empty).is_err());
    }
}
