//! # npls-kernels
//!
//! Array kernels underneath the N-way PLS engine.
//!
//! ## Overview
//!
//! - **Missing-data aware sums and products** - NaN marks a missing element;
//!   sums are standardized for the number of valid terms ([`miss_sum`],
//!   [`miss_sum_columns`], [`miss_mult`])
//! - **Column-major unfolding** - sample-mode and mode-n matricization with
//!   the first index varying fastest ([`unfold_samples`], [`fold_samples`],
//!   [`unfold_mode`], [`refold`])
//! - **Kronecker products** - combined last mode first to line up with the
//!   unfolding ([`kronecker_modes`], [`kronecker_modes_vectors`])
//! - **Outer products** - per-component outer products of factor matrices,
//!   with an optional left-out mode ([`outer_modes`], [`outer_modes_vectorized`])
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::{array, Array, IxDyn};
//! use npls_kernels::{kronecker_modes_vectors, miss_mult, unfold_samples};
//!
//! // Missing-data aware product
//! let a = array![[1.0, f64::NAN], [2.0, 3.0]];
//! let b = array![[1.0], [1.0]];
//! let c = miss_mult(&a.view(), &b.view()).unwrap();
//! assert_eq!(c[[0, 0]], 2.0);
//!
//! // Sample-mode unfolding of a 3-way array
//! let x = Array::<f64, _>::zeros(IxDyn(&[4, 2, 3]));
//! assert_eq!(unfold_samples(&x).unwrap().shape(), &[4, 6]);
//!
//! // Mode loadings combined last mode first
//! let w1 = array![1.0, 0.0];
//! let w2 = array![0.0, 1.0, 0.0];
//! assert_eq!(kronecker_modes_vectors(&[w1.view(), w2.view()]).unwrap().len(), 6);
//! ```
//!
//! ## SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext` and numeric traits
//! come from `scirs2_core::numeric`.

#![deny(warnings)]

pub mod error;
pub mod kronecker;
pub mod missing;
pub mod outer;
pub mod unfold;


// Re-exports
pub use error::{KernelError, KernelResult};
pub use kronecker::*;
pub use missing::*;
pub use outer::*;
pub use unfold::*;
