//! Rank-one CP decomposition (CP-ALS at R = 1)
//!
//! The N-way PLS loading update reshapes the cross product `X^T u` into the
//! predictor modes and approximates it by a single rank-one term:
//!
//! W ≈ λ (w₁ ∘ w₂ ∘ ... ∘ wₙ)
//!
//! At rank one the ALS update for mode `n` is a contraction of W with every
//! other mode's vector, so no Gram solve is needed. Factors are initialized
//! from the leading left singular vector of each mode-n unfolding (HOSVD
//! style, found by power iteration), which makes an exactly rank-one input
//! converge in a single sweep.
//!
//! # SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.

use crate::utils::{leading_left_singular_vector, norm};
use npls_kernels::{unfold_mode, KernelError};
use scirs2_core::ndarray_ext::{Array1, ArrayD};
use scirs2_linalg::LinalgError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CpError {
    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(f64),

    #[error("Invalid iteration limit: {0}")]
    InvalidIterations(usize),

    #[error("Linear algebra error: {0}")]
    LinalgError(#[from] LinalgError),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Convergence failed after {0} iterations")]
    ConvergenceFailed(usize),
}

/// Decomposes an array into one vector per mode whose outer product
/// approximates it.
///
/// The returned vectors carry the scale of the approximation but no
/// particular normalization or sign; callers normalize them.
pub trait RankOneDecomposer: Send + Sync {
    fn decompose(&self, tensor: &ArrayD<f64>) -> Result<Vec<Array1<f64>>, CpError>;
}

/// Rank-one CP-ALS with HOSVD-style initialization
#[derive(Debug, Clone, Copy)]
pub struct CpAlsRankOne {
    /// Maximum number of ALS sweeps
    pub max_iters: usize,

    /// Convergence threshold on the relative change of the component weight
    pub tol: f64,
}

impl Default for CpAlsRankOne {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            tol: 1e-12,
        }
    }
}

impl CpAlsRankOne {
    pub fn new(max_iters: usize, tol: f64) -> Self {
        Self { max_iters, tol }
    }

    fn validate(&self) -> Result<(), CpError> {
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(CpError::InvalidTolerance(self.tol));
        }
        if self.max_iters == 0 {
            return Err(CpError::InvalidIterations(self.max_iters));
        }
        Ok(())
    }
}

impl RankOneDecomposer for CpAlsRankOne {
    fn decompose(&self, tensor: &ArrayD<f64>) -> Result<Vec<Array1<f64>>, CpError> {
        self.validate()?;

        let shape = tensor.shape().to_vec();
        if shape.is_empty() || shape.iter().any(|&d| d == 0) {
            return Err(CpError::ShapeMismatch(format!(
                "cannot decompose an array of shape {:?}",
                shape
            )));
        }
        let n_modes = shape.len();

        if n_modes == 1 {
            return Ok(vec![tensor.iter().copied().collect()]);
        }

        let mut factors = Vec::with_capacity(n_modes);
        for mode in 0..n_modes {
            let unfolded = unfold_mode(tensor, mode)?;
            factors.push(leading_left_singular_vector(&unfolded));
        }

        let mut weight = 0.0;
        for iter in 0..self.max_iters {
            let prev_weight = weight;

            for mode in 0..n_modes {
                let mut updated = contract_except(tensor, &factors, mode);
                weight = norm(&updated);
                if weight == 0.0 {
                    // A zero array has no direction to recover.
                    factors[mode] = updated;
                    return Ok(factors);
                }
                updated.mapv_inplace(|x| x / weight);
                factors[mode] = updated;
            }

            if !weight.is_finite() {
                return Err(CpError::ConvergenceFailed(iter + 1));
            }
            if (weight - prev_weight).abs() <= self.tol * weight {
                factors[0].mapv_inplace(|x| x * weight);
                return Ok(factors);
            }
        }

        Err(CpError::ConvergenceFailed(self.max_iters))
    }
}

/// Contract `tensor` with the factor of every mode except `skip`.
fn contract_except(tensor: &ArrayD<f64>, factors: &[Array1<f64>], skip: usize) -> Array1<f64> {
    let mut result = Array1::<f64>::zeros(tensor.shape()[skip]);
    for (idx, &val) in tensor.indexed_iter() {
        let mut prod = val;
        for (mode, factor) in factors.iter().enumerate() {
            if mode != skip {
                prod *= factor[idx[mode]];
            }
        }
        result[idx[skip]] += prod;
    }
    result
}
