//! Linear-algebra helpers shared by the decompositions

use scirs2_core::ndarray_ext::{Array1, Array2};
use scirs2_linalg::{lstsq, LinalgError};

/// Moore-Penrose pseudo-inverse of a full-rank matrix.
///
/// A tall matrix is inverted column by column, solving `A x = eᵢ` against
/// each identity column with the QR least-squares solver; a wide matrix goes
/// through its transpose. A zero matrix gives the zero pseudo-inverse.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use npls_decomp::pseudo_inverse;
///
/// let a = array![[2.0, 0.0], [0.0, 4.0], [0.0, 0.0]];
/// let p = pseudo_inverse(&a).unwrap();
/// assert_eq!(p.shape(), &[2, 3]);
/// assert!((p[[0, 0]] - 0.5).abs() < 1e-12);
/// assert!((p[[1, 1]] - 0.25).abs() < 1e-12);
/// ```
pub fn pseudo_inverse(a: &Array2<f64>) -> Result<Array2<f64>, LinalgError> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 || a.iter().all(|&x| x == 0.0) {
        return Ok(Array2::zeros((n, m)));
    }
    if m < n {
        let transposed = a.t().to_owned();
        return Ok(pseudo_inverse(&transposed)?.reversed_axes());
    }

    let mut pinv = Array2::<f64>::zeros((n, m));
    let mut unit = Array1::<f64>::zeros(m);
    for j in 0..m {
        unit[j] = 1.0;
        let solution = lstsq(&a.view(), &unit.view(), None)?;
        pinv.column_mut(j).assign(&solution.x);
        unit[j] = 0.0;
    }

    Ok(pinv)
}

const POWER_ITERATIONS: usize = 200;

/// Leading left singular vector by power iteration on `A Aᵀ`.
///
/// Starts from the column with the largest norm, so a rank-one matrix is
/// resolved in one step. A zero matrix gives a zero vector.
pub(crate) fn leading_left_singular_vector(a: &Array2<f64>) -> Array1<f64> {
    let start = (0..a.ncols())
        .map(|j| (j, a.column(j).iter().map(|x| x * x).sum::<f64>()))
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0;

    let mut u = a.column(start).to_owned();
    let size = norm(&u);
    if size == 0.0 || !size.is_finite() {
        return Array1::zeros(a.nrows());
    }
    u.mapv_inplace(|x| x / size);

    for _ in 0..POWER_ITERATIONS {
        let mut next = a.dot(&a.t().dot(&u));
        let size = norm(&next);
        if size == 0.0 || !size.is_finite() {
            break;
        }
        next.mapv_inplace(|x| x / size);
        let change = norm(&(&next - &u));
        u = next;
        if change <= 1e-14 {
            break;
        }
    }
    u
}

/// Euclidean norm of a vector.
#[inline]
pub(crate) fn norm(v: &Array1<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
