//! Loading update: mode weights from a data block and a score vector
//!
//! The cross product `Xᵀu` of the unfolded block is reshaped to the
//! non-sample modes and, for three or more modes, approximated by a rank-one
//! outer product. Every resulting vector is scaled to unit length and given
//! a deterministic sign: positive when its large entries are mostly positive
//! (`Σ v² sign(v) ≥ 0`).

use crate::error::{NplsError, NplsResult};
use npls_decomp::RankOneDecomposer;
use npls_kernels::{kronecker_modes_vectors, refold};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1};

/// Per-mode loading vectors and their Kronecker combination
#[derive(Debug, Clone)]
pub struct Loadings {
    /// One unit vector per non-sample mode
    pub modes: Vec<Array1<f64>>,
    /// `modes[last] ⊗ ... ⊗ modes[0]`, aligned with the column-major unfolding
    pub kron: Array1<f64>,
}

/// Raw weights `Xᵀu`.
///
/// With `missing` set, column `i` only uses rows where both `x[:, i]` and
/// `u` are present, and is divided by the masked `u·u` (when non-zero). A
/// column without any usable row gets weight 0.
pub fn masked_cross_product(x: &Array2<f64>, u: &ArrayView1<f64>, missing: bool) -> Array1<f64> {
    if !missing {
        return x.t().dot(u);
    }

    Array1::from_iter(x.columns().into_iter().map(|col| {
        let mut xu = 0.0;
        let mut uu = 0.0;
        let mut used = 0usize;
        for (&xi, &ui) in col.iter().zip(u.iter()) {
            if !xi.is_nan() && !ui.is_nan() {
                xu += xi * ui;
                uu += ui * ui;
                used += 1;
            }
        }
        if used == 0 {
            0.0
        } else if uu != 0.0 {
            xu / uu
        } else {
            xu
        }
    }))
}

/// Scale to unit L2 norm and apply the sign convention.
///
/// A zero vector has no direction and comes back as NaN. When the sign sum
/// is exactly zero the vector keeps the sign it came with.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls::normalize_with_sign;
///
/// let v = normalize_with_sign(&array![-3.0, 1.0].view());
/// assert!((v[0] - 3.0 / 10f64.sqrt()).abs() < 1e-12);
/// assert!(v[1] < 0.0);
/// ```
pub fn normalize_with_sign(v: &ArrayView1<f64>) -> Array1<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    let unit = v.mapv(|x| x / norm);
    let direction: f64 = unit.iter().map(|&x| x * x * x.signum()).sum();
    if direction < 0.0 {
        -unit
    } else {
        unit
    }
}

/// Compute the loadings of a data block for the score vector `u`.
///
/// `x` is the sample-mode unfolding of a block whose non-sample modes have
/// sizes `mode_dims`. One mode gives `[w]` directly; more modes reshape `w`
/// column-major and split it with `decomposer`.
///
/// # Errors
///
/// Returns a shape error if `x` does not match `u` or `mode_dims`, and
/// propagates rank-one decomposition failures.
pub fn loading_update<D>(
    x: &Array2<f64>,
    u: &ArrayView1<f64>,
    mode_dims: &[usize],
    missing: bool,
    decomposer: &D,
) -> NplsResult<Loadings>
where
    D: RankOneDecomposer + ?Sized,
{
    if x.nrows() != u.len() {
        return Err(NplsError::ShapeMismatch(format!(
            "block has {} rows but the score vector has {} entries",
            x.nrows(),
            u.len()
        )));
    }
    let expected: usize = mode_dims.iter().product();
    if mode_dims.is_empty() || x.ncols() != expected {
        return Err(NplsError::ShapeMismatch(format!(
            "block has {} columns, mode sizes {:?} give {}",
            x.ncols(),
            mode_dims,
            expected
        )));
    }

    let w = masked_cross_product(x, u, missing);

    let raw = if mode_dims.len() == 1 {
        vec![w]
    } else {
        let reshaped = refold(&w.to_vec(), mode_dims)?;
        decomposer.decompose(&reshaped)?
    };

    let lengths: Vec<usize> = raw.iter().map(|v| v.len()).collect();
    if lengths != mode_dims {
        return Err(NplsError::ShapeMismatch(format!(
            "rank-one factors have lengths {:?}, expected {:?}",
            lengths, mode_dims
        )));
    }

    let modes: Vec<Array1<f64>> = raw.iter().map(|v| normalize_with_sign(&v.view())).collect();
    let views: Vec<ArrayView1<f64>> = modes.iter().map(|v| v.view()).collect();
    let kron = kronecker_modes_vectors(&views)?;

    Ok(Loadings { modes, kron })
}

#[cfg(test)]
mod tests {
    use super::*;
    use npls_decomp::CpAlsRankOne;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_cross_product_without_missing() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let u = array![1.0, 0.0, -1.0];
        let w = masked_cross_product(&x, &u.view(), false);
        assert_eq!(w, array![-4.0, -4.0]);
    }

    #[test]
    fn test_cross_product_masks_missing_rows() {
        let x = array![[1.0, 2.0], [f64::NAN, 4.0], [5.0, f64::NAN]];
        let u = array![1.0, 2.0, 1.0];
        let w = masked_cross_product(&x, &u.view(), true);
        // column 0 uses rows 0 and 2: (1 + 5) / (1 + 1)
        assert_eq!(w[0], 3.0);
        // column 1 uses rows 0 and 1: (2 + 8) / (1 + 4)
        assert_eq!(w[1], 2.0);
    }

    #[test]
    fn test_cross_product_empty_mask_is_zero() {
        let x = array![[f64::NAN, 1.0], [f64::NAN, 1.0]];
        let u = array![1.0, 1.0];
        let w = masked_cross_product(&x, &u.view(), true);
        assert_eq!(w[0], 0.0);
    }

    #[test]
    fn test_cross_product_zero_denominator_uses_plain_dot() {
        let x = array![[1.0], [2.0]];
        let u = array![0.0, 0.0];
        let w = masked_cross_product(&x, &u.view(), true);
        assert_eq!(w[0], 0.0);
    }

    #[test]
    fn test_normalize_with_sign() {
        let v = normalize_with_sign(&array![-1.0, -1.0, 0.5].view());
        assert!(v[0] > 0.0 && v[1] > 0.0 && v[2] < 0.0);
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_vector_keeps_its_sign() {
        // Σ v² sign(v) is exactly zero: the vector is scaled, never zeroed
        let v = normalize_with_sign(&array![1.0, -1.0].view());
        let s = 1.0 / 2.0f64.sqrt();
        assert!((v[0] - s).abs() < 1e-15);
        assert!((v[1] + s).abs() < 1e-15);

        let v = normalize_with_sign(&array![-2.0, 2.0].view());
        assert!(v[0] < 0.0 && v[1] > 0.0);
    }

    #[test]
    fn test_two_way_block_gives_single_mode() {
        let x = array![[1.0, 2.0, 2.0], [0.0, 1.0, 0.0]];
        let u = array![1.0, 0.0];
        let l = loading_update(&x, &u.view(), &[3], false, &CpAlsRankOne::default()).unwrap();
        assert_eq!(l.modes.len(), 1);
        assert_eq!(l.kron, l.modes[0]);
        assert!((l.kron[0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_way_block_splits_modes() {
        // columns j1 + 2*j2 of a rank-one (2, 3) weight pattern
        let a = array![1.0, 2.0];
        let b = array![1.0, -1.0, 3.0];
        let x = Array2::from_shape_fn((1, 6), |(_, j)| a[j % 2] * b[j / 2]);
        let u = array![2.0];

        let l = loading_update(&x, &u.view(), &[2, 3], false, &CpAlsRankOne::default()).unwrap();
        assert_eq!(l.modes.len(), 2);
        assert_eq!(l.modes[0].len(), 2);
        assert_eq!(l.modes[1].len(), 3);
        for (k, &v) in l.kron.iter().enumerate() {
            let expected = a[k % 2] * b[k / 2] / (5.0f64.sqrt() * 11.0f64.sqrt());
            assert!((v - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_shape_errors() {
        let x = Array2::<f64>::zeros((2, 6));
        let u = array![1.0, 1.0, 1.0];
        let d = CpAlsRankOne::default();
        assert!(loading_update(&x, &u.view(), &[6], false, &d).is_err());

        let u = array![1.0, 1.0];
        assert!(loading_update(&x, &u.view(), &[2, 2], false, &d).is_err());
    }
}
