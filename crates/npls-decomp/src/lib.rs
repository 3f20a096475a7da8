//! # npls-decomp - Decompositions for N-way PLS
//!
//! Multilinear building blocks used by the N-way PLS engine.
//!
//! ## Overview
//!
//! ### Rank-one CP
//!
//! Approximates an array by a single outer product of per-mode vectors:
//!
//! ```text
//! W ≈ λ (w₁ ∘ w₂ ∘ ... ∘ wₙ)
//! ```
//!
//! Exposed through the [`RankOneDecomposer`] trait so the engine can take a
//! different decomposition; [`CpAlsRankOne`] is the HOSVD-initialized ALS
//! default.
//!
//! ### Tucker core
//!
//! Computes the core G of a Tucker model for given factors:
//!
//! ```text
//! X ≈ G ×₁ F₁ ×₂ F₂ ×₃ ... ×ₙ Fₙ
//! ```
//!
//! with an orthogonal (transpose) or oblique (pseudo-inverse) projection,
//! uncompressed Tucker2 modes and missing-data tolerance ([`tucker_core`]).
//!
//! ### Score seeding
//!
//! First principal component scores of a matrix, uncentered and tolerant
//! of missing values ([`LeadingScores`], [`NipalsPca`]).
//!
//! ## Quick Start
//!
//! ```
//! use scirs2_core::ndarray_ext::{Array, IxDyn};
//! use npls_decomp::{CpAlsRankOne, RankOneDecomposer};
//!
//! let w = Array::from_shape_fn(IxDyn(&[3, 4]), |idx| ((idx[0] + 1) * (idx[1] + 2)) as f64);
//! let vectors = CpAlsRankOne::default().decompose(&w)?;
//! assert_eq!(vectors.len(), 2);
//! assert_eq!(vectors[1].len(), 4);
//! # Ok::<(), npls_decomp::CpError>(())
//! ```
//!
//! ## SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext`.
//! Least-squares solves use `scirs2_linalg`.

#![deny(warnings)]

pub mod cp;
pub mod pca;
pub mod tucker;
pub mod utils;

#[cfg(test)]
mod property_tests;

// Re-exports
pub use cp::*;
pub use pca::*;
pub use tucker::*;
pub use utils::pseudo_inverse;
