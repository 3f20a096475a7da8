//! Fitted N-way PLS model

use crate::error::{NplsError, NplsResult};
use npls_kernels::{fold_samples, fortran_flatten, has_missing, miss_mult, unfold_samples};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayD};

/// Result of an N-way PLS fit
///
/// Factor matrices hold one column per component, in extraction order.
#[derive(Debug, Clone)]
pub struct NplsModel {
    /// `[T, W₁, ..., Wₚ]`: X scores followed by one loading matrix per X mode
    pub x_factors: Vec<Array2<f64>>,

    /// `[U, Q₁, ..., Q_q]`: Y scores followed by one loading matrix per Y mode
    pub y_factors: Vec<Array2<f64>>,

    /// Tucker core of the X model using the first `a + 1` components, one
    /// `(a+1, ..., a+1)` array per component count
    pub core: Vec<ArrayD<f64>>,

    /// Inner regression of U on T; column `a` holds the fit of `U[:, a]`
    /// on the first `a + 1` score columns
    pub b: Array2<f64>,

    /// Prediction of Y with all components, in Y's shape
    pub y_pred: ArrayD<f64>,

    /// Prediction of Y for each component count
    pub y_pred_by_component: Vec<ArrayD<f64>>,

    /// `(n_components + 1) × 2`: residual sum of squares and percent of X
    /// explained; row 0 holds the total sum of squares
    pub ssx: Array2<f64>,

    /// As `ssx`, for Y
    pub ssy: Array2<f64>,

    /// Regression coefficients `reg[iy][a]` in the predictor shape, for each
    /// Y column and component count. `None` for multiway Y.
    pub reg: Option<Vec<Vec<ArrayD<f64>>>>,

    /// Kronecker combinations of the Y loadings, one column per component
    pub q_kron: Array2<f64>,

    /// Unfolded X minus the model with all components
    pub x_residual: Array2<f64>,

    /// Unfolded Y minus the prediction with all components
    pub y_residual: Array2<f64>,

    /// X held missing (NaN) values
    pub missing_x: bool,

    /// Y held missing (NaN) values
    pub missing_y: bool,

    /// Inner loop iterations per component
    pub iterations: Vec<usize>,

    pub(crate) x_shape: Vec<usize>,
    pub(crate) y_shape: Vec<usize>,
}

impl NplsModel {
    pub fn n_components(&self) -> usize {
        self.b.ncols()
    }

    /// X scores `T`
    pub fn x_scores(&self) -> &Array2<f64> {
        &self.x_factors[0]
    }

    /// Y scores `U`
    pub fn y_scores(&self) -> &Array2<f64> {
        &self.y_factors[0]
    }

    /// Percent of X explained by 1, 2, ... components
    pub fn explained_x(&self) -> Array1<f64> {
        self.ssx.column(1).iter().skip(1).copied().collect()
    }

    /// Percent of Y explained by 1, 2, ... components
    pub fn explained_y(&self) -> Array1<f64> {
        self.ssy.column(1).iter().skip(1).copied().collect()
    }

    /// Predict Y for new samples with the first `n_components` components.
    ///
    /// `x_new` must have the fitted predictor modes; its first axis may hold
    /// any number of samples. Missing values in `x_new` are handled like
    /// missing terms in a product: the remaining terms are rescaled.
    ///
    /// # Errors
    ///
    /// Fails for multiway Y (no regression coefficients), for a component
    /// count outside `1..=n_components()`, or for mismatched predictor modes.
    pub fn predict(&self, x_new: &ArrayD<f64>, n_components: usize) -> NplsResult<ArrayD<f64>> {
        let reg = self.reg.as_ref().ok_or(NplsError::RegressionUnavailable)?;
        if n_components == 0 || n_components > self.n_components() {
            return Err(NplsError::InvalidComponentCount {
                requested: n_components,
                available: self.n_components(),
            });
        }
        if x_new.ndim() != self.x_shape.len() || x_new.shape()[1..] != self.x_shape[1..] {
            return Err(NplsError::ShapeMismatch(format!(
                "model was fitted on predictor modes {:?}, got {:?}",
                &self.x_shape[1..],
                x_new.shape().get(1..).unwrap_or(&[])
            )));
        }

        let x = unfold_samples(x_new)?;
        let n_samples = x.nrows();
        let n_responses = reg.len();

        // one coefficient column per response
        let mut coefficients = Array2::<f64>::zeros((x.ncols(), n_responses));
        for (iy, per_component) in reg.iter().enumerate() {
            let r = &per_component[n_components - 1];
            for (dst, &src) in coefficients
                .column_mut(iy)
                .iter_mut()
                .zip(fortran_flatten(&r.view()).iter())
            {
                *dst = src;
            }
        }

        let predicted = if has_missing(&x.view()) {
            miss_mult(&x.view(), &coefficients.view())?
        } else {
            x.dot(&coefficients)
        };

        let mut shape = self.y_shape.clone();
        shape[0] = n_samples;
        Ok(fold_samples(&predicted, &shape)?)
    }
}
