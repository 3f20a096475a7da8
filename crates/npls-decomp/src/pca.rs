//! One-component NIPALS PCA for seeding latent scores
//!
//! N-way PLS starts the inner loop for a multi-column response from the
//! first principal component scores of the current response residual. The
//! data are not centered, and missing entries (NaN) are skipped in every
//! regression step.

use npls_kernels::masked_sum_squares;
use scirs2_core::ndarray_ext::{Array1, Array2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PcaError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(f64),
}

/// Produces one score per sample row of a matrix.
pub trait LeadingScores: Send + Sync {
    fn leading_scores(&self, data: &Array2<f64>) -> Result<Array1<f64>, PcaError>;
}

/// Uncentered, missing-data tolerant NIPALS for the first component
#[derive(Debug, Clone, Copy)]
pub struct NipalsPca {
    pub max_iters: usize,
    pub tol: f64,
}

impl Default for NipalsPca {
    fn default() -> Self {
        Self {
            max_iters: 500,
            tol: 1e-12,
        }
    }
}

impl LeadingScores for NipalsPca {
    fn leading_scores(&self, data: &Array2<f64>) -> Result<Array1<f64>, PcaError> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Err(PcaError::EmptyInput(format!(
                "cannot extract scores from a {}x{} matrix",
                rows, cols
            )));
        }
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(PcaError::InvalidTolerance(self.tol));
        }

        // start from the column with the largest sum of squares
        let start = (0..cols)
            .map(|j| (j, masked_sum_squares(&data.column(j))))
            .fold((0, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            })
            .0;
        let mut scores = data.column(start).mapv(|x| if x.is_nan() { 0.0 } else { x });
        if scores.iter().all(|&x| x == 0.0) {
            return Ok(scores);
        }

        for _ in 0..self.max_iters {
            let mut loadings = masked_regression(data, &scores, MaskAxis::Columns);
            let norm = loadings.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm == 0.0 || !norm.is_finite() {
                break;
            }
            loadings.mapv_inplace(|x| x / norm);

            let updated = masked_regression(data, &loadings, MaskAxis::Rows);
            let change = (&updated - &scores).iter().map(|x| x * x).sum::<f64>().sqrt();
            let size = updated.iter().map(|x| x * x).sum::<f64>().sqrt();
            scores = updated;

            if change <= self.tol * size {
                break;
            }
        }

        Ok(scores)
    }
}

enum MaskAxis {
    /// one coefficient per column, regressing on the row vector
    Columns,
    /// one coefficient per row, regressing on the column vector
    Rows,
}

/// Least-squares coefficient of each column (or row) on `v`, over the
/// valid entries only. A slot with no valid entry gets 0.
fn masked_regression(data: &Array2<f64>, v: &Array1<f64>, axis: MaskAxis) -> Array1<f64> {
    let lines = match axis {
        MaskAxis::Columns => data.columns(),
        MaskAxis::Rows => data.rows(),
    };

    Array1::from_iter(lines.into_iter().map(|line| {
        let mut num = 0.0;
        let mut den = 0.0;
        for (&x, &w) in line.iter().zip(v.iter()) {
            if !x.is_nan() {
                num += x * w;
                den += w * w;
            }
        }
        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    }))
}
