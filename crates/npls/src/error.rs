//! Error types for N-way PLS fitting and prediction

use npls_decomp::{CpError, PcaError, TuckerError};
use npls_kernels::KernelError;
use scirs2_linalg::LinalgError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NplsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("Rank-one decomposition failed: {0}")]
    Decomposition(#[from] CpError),

    #[error("Tucker core failed: {0}")]
    Tucker(#[from] TuckerError),

    #[error("Score seeding failed: {0}")]
    Seeding(#[from] PcaError),

    #[error("Linear algebra error: {0}")]
    LinalgError(#[from] LinalgError),

    #[error("Component {component} is degenerate: {reason}")]
    DegenerateComponent { component: usize, reason: String },

    #[error("Regression coefficients are only available for vector or two-way Y")]
    RegressionUnavailable,

    #[error("Invalid component count {requested}: model has {available} components")]
    InvalidComponentCount { requested: usize, available: usize },
}

pub type NplsResult<T> = Result<T, NplsError>;
