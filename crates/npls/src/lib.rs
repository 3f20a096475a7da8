//! # npls - N-way Partial Least Squares
//!
//! Multilinear PLS regression of a multiway response on a multiway
//! predictor array, with missing-data support.
//!
//! ## Overview
//!
//! N-way PLS decomposes X `(I, J₁, ..., Jₚ)` into scores `T` and one unit
//! loading vector per mode for each latent component, chosen so that the
//! scores covary maximally with the scores `U` of Y `(I, K₁, ..., K_q)`:
//!
//! ```text
//! X ≈ G ×₁ T ×₂ W₁ ×₃ ... ×ₚ₊₁ Wₚ        U ≈ T B
//! ```
//!
//! The fitted [`NplsModel`] carries:
//!
//! - **Factors** - `[T, W₁, ...]` and `[U, Q₁, ...]`
//! - **Tucker cores** - the X model core for each component count
//! - **Inner regression** - upper-triangular `B`
//! - **Predictions** - Y predicted with 1, 2, ... components
//! - **Variance tables** - residual sums of squares and percent explained
//! - **Regression coefficients** - in the predictor shape, for vector or
//!   two-way Y, usable for [`NplsModel::predict`]
//!
//! Missing values are NaN and are masked throughout.
//!
//! ## Quick Start
//!
//! ```
//! use scirs2_core::ndarray_ext::{Array, IxDyn};
//! use npls::{Npls, NplsConfig};
//!
//! // 8 samples, 4 variables measured at 3 conditions
//! let x = Array::from_shape_fn(IxDyn(&[8, 4, 3]), |idx| {
//!     let (i, j, k) = (idx[0] as f64, idx[1] as f64, idx[2] as f64);
//!     (i + 1.0) * (j + 1.0) * (3.0 - k) + 0.1 * (i * j + k).sin()
//! });
//! let y = Array::from_shape_fn(IxDyn(&[8, 2]), |idx| {
//!     let i = idx[0] as f64;
//!     if idx[1] == 0 { i } else { 0.5 * i - 1.0 }
//! });
//!
//! let model = Npls::new(NplsConfig::new(2).with_seed(42)).fit(&x, &y)?;
//! assert_eq!(model.core.len(), 2);
//! assert_eq!(model.y_pred.shape(), &[8, 2]);
//!
//! let y_hat = model.predict(&x, 2)?;
//! assert_eq!(y_hat.shape(), &[8, 2]);
//! # Ok::<(), npls::NplsError>(())
//! ```
//!
//! ## Logging
//!
//! Fitting emits `tracing` events; enable the `subscriber` feature for
//! [`tracing_support::init_tracing`].
//!
//! ## SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.
//! Least squares comes from `scirs2_linalg`; random starts from
//! `scirs2_core::random`.

#![deny(warnings)]

pub mod config;
pub mod engine;
pub mod error;
pub mod loading;
pub mod model;

#[cfg(feature = "subscriber")]
pub mod tracing_support;


// Re-exports
pub use config::{NplsConfig, SignAlignment};
pub use engine::Npls;
pub use error::{NplsError, NplsResult};
pub use loading::{loading_update, masked_cross_product, normalize_with_sign, Loadings};
pub use model::NplsModel;

pub use npls_decomp::{
    CoreFactor, CoreProjection, CpAlsRankOne, CpError, LeadingScores, NipalsPca, PcaError,
    RankOneDecomposer,
};
