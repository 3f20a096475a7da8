//! Tucker core for given factor matrices
//!
//! Given an array X with modes `(I₀, I₁, ..., Iₙ₋₁)` and one factor matrix
//! per mode, computes the core G such that
//!
//! X ≈ G ×₀ F₀ ×₁ F₁ ×₂ ... ×ₙ₋₁ Fₙ₋₁
//!
//! # Projections
//!
//! ## Orthogonal
//! For orthonormal factors the core is the projection `X ×₀ F₀ᵀ ×₁ F₁ᵀ ...`,
//! applied one mode at a time on the mode-n unfolding.
//!
//! ## Oblique
//! For general factors the sample-mode unfolding is solved on both sides:
//! `G = pinv(F₀) · X₍₀₎ · pinv(R)` with `R = (Fₙ₋₁ ⊗ ... ⊗ F₁)ᵀ`. The
//! right pseudo-inverse is assembled from the per-mode pseudo-inverses.
//!
//! A mode marked [`CoreFactor::PassThrough`] is left uncompressed (Tucker2
//! style) and keeps its original dimension in the core. Missing values (NaN)
//! in X switch every product to the missing-data aware `miss_mult`.
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.
//! Pseudo-inverses are solved with the least-squares solver from
//! `scirs2_linalg`.

use crate::utils::pseudo_inverse;
use npls_kernels::{
    fold_mode, fortran_flatten, has_missing, kronecker_modes, miss_mult, refold, unfold_mode,
    unfold_samples, KernelError,
};
use scirs2_core::ndarray_ext::{Array2, ArrayD, ArrayView2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuckerError {
    #[error("Pseudo-inverse failed: {0}")]
    PseudoInverse(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Factor for one mode of the core computation
#[derive(Debug, Clone)]
pub enum CoreFactor {
    /// Compress the mode with this `(Iₙ, Rₙ)` matrix
    Projection(Array2<f64>),
    /// Leave the mode uncompressed (identity factor)
    PassThrough,
}

impl CoreFactor {
    fn matrix(&self, dim: usize) -> Array2<f64> {
        match self {
            CoreFactor::Projection(f) => f.clone(),
            CoreFactor::PassThrough => Array2::eye(dim),
        }
    }

    fn compressed_dim(&self, dim: usize) -> usize {
        match self {
            CoreFactor::Projection(f) => f.ncols(),
            CoreFactor::PassThrough => dim,
        }
    }
}

impl From<Array2<f64>> for CoreFactor {
    fn from(f: Array2<f64>) -> Self {
        CoreFactor::Projection(f)
    }
}

/// How the core is solved from the factors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoreProjection {
    /// Project through `Fᵀ`; exact for orthonormal factors
    #[default]
    Orthogonal,
    /// Solve with pseudo-inverses; valid for any full-rank factors
    Oblique,
}

/// Compute the Tucker core of `x` for the given factors.
///
/// Returns an array with one axis per mode, sized by the factor's column
/// count (or the original dimension for pass-through modes).
///
/// # Errors
///
/// Returns [`TuckerError::ShapeMismatch`] if the number of factors differs
/// from the number of modes or a factor's row count differs from its mode's
/// dimension. Least-squares failures in the oblique path are reported as
/// [`TuckerError::PseudoInverse`].
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{array, Array, IxDyn};
/// use npls_decomp::{tucker_core, CoreFactor, CoreProjection};
///
/// let x = Array::from_shape_fn(IxDyn(&[3, 2, 2]), |idx| (idx[0] + idx[1] * idx[2]) as f64);
/// let factors = vec![
///     CoreFactor::Projection(array![[1.0], [0.0], [0.0]]),
///     CoreFactor::PassThrough,
///     CoreFactor::Projection(array![[0.0], [1.0]]),
/// ];
/// let core = tucker_core(&x, &factors, CoreProjection::Orthogonal).unwrap();
/// assert_eq!(core.shape(), &[1, 2, 1]);
/// assert_eq!(core[[0, 1, 0]], 1.0);
/// ```
pub fn tucker_core(
    x: &ArrayD<f64>,
    factors: &[CoreFactor],
    projection: CoreProjection,
) -> Result<ArrayD<f64>, TuckerError> {
    let dims = x.shape().to_vec();
    validate_factors(&dims, factors)?;

    let core_dims: Vec<usize> = factors
        .iter()
        .zip(dims.iter())
        .map(|(f, &d)| f.compressed_dim(d))
        .collect();
    let missing = has_missing(&x.view());

    match projection {
        CoreProjection::Orthogonal => orthogonal_core(x, factors, &dims, missing),
        CoreProjection::Oblique => oblique_core(x, factors, &dims, &core_dims, missing),
    }
}

fn validate_factors(dims: &[usize], factors: &[CoreFactor]) -> Result<(), TuckerError> {
    if factors.len() != dims.len() {
        return Err(TuckerError::ShapeMismatch(format!(
            "{} factors given for an array with {} modes",
            factors.len(),
            dims.len()
        )));
    }

    for (mode, (factor, &dim)) in factors.iter().zip(dims.iter()).enumerate() {
        if let CoreFactor::Projection(f) = factor {
            if f.nrows() != dim {
                return Err(TuckerError::ShapeMismatch(format!(
                    "factor for mode {} has {} rows, expected {}",
                    mode,
                    f.nrows(),
                    dim
                )));
            }
        }
    }

    Ok(())
}

fn product(
    a: &ArrayView2<f64>,
    b: &ArrayView2<f64>,
    missing: bool,
) -> Result<Array2<f64>, TuckerError> {
    if missing {
        Ok(miss_mult(a, b)?)
    } else {
        Ok(a.dot(b))
    }
}

fn orthogonal_core(
    x: &ArrayD<f64>,
    factors: &[CoreFactor],
    dims: &[usize],
    missing: bool,
) -> Result<ArrayD<f64>, TuckerError> {
    let mut current = x.clone();
    let mut current_dims = dims.to_vec();

    for (mode, factor) in factors.iter().enumerate() {
        let f = factor.matrix(dims[mode]);
        let unfolded = unfold_mode(&current, mode)?;
        let reduced = product(&f.t(), &unfolded.view(), missing)?;

        current_dims[mode] = factor.compressed_dim(dims[mode]);
        current = fold_mode(&reduced, mode, &current_dims)?;
    }

    Ok(current)
}

fn oblique_core(
    x: &ArrayD<f64>,
    factors: &[CoreFactor],
    dims: &[usize],
    core_dims: &[usize],
    missing: bool,
) -> Result<ArrayD<f64>, TuckerError> {
    let left = factors[0].matrix(dims[0]);
    let left_pinv = pseudo_inverse(&left)
        .map_err(|e| TuckerError::PseudoInverse(format!("mode 0 factor: {}", e)))?;

    // pinv((F_{N-1} ⊗ ... ⊗ F_1)^T) = (pinv(F_{N-1}) ⊗ ... ⊗ pinv(F_1))^T,
    // which stays well posed when the Kronecker product is rank deficient
    let right_pinv = if factors.len() > 1 {
        let mut inverses = Vec::with_capacity(factors.len() - 1);
        for (mode, (f, &d)) in factors.iter().zip(dims.iter()).enumerate().skip(1) {
            let inverse = pseudo_inverse(&f.matrix(d)).map_err(|e| {
                TuckerError::PseudoInverse(format!("mode {} factor: {}", mode, e))
            })?;
            inverses.push(inverse);
        }
        let views: Vec<ArrayView2<f64>> = inverses.iter().map(|m| m.view()).collect();
        kronecker_modes(&views)?.reversed_axes()
    } else {
        Array2::eye(1)
    };

    let unfolded = unfold_samples(x)?;
    let reduced = product(&left_pinv.view(), &unfolded.view(), missing)?;
    let core = product(&reduced.view(), &right_pinv.view(), missing)?;

    Ok(refold(&fortran_flatten(&core.view()), core_dims)?)
}
