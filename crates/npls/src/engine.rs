//! N-way PLS fitting
//!
//! Components are extracted one at a time. For component `a`:
//!
//! 1. seed the Y score `u` (the response itself for a single column, else
//!    its first principal component scores);
//! 2. alternate X loadings, X scores, Y loadings and Y scores from a random
//!    start until the X scores settle;
//! 3. align the sign of the X scores against the Y scores;
//! 4. compute the Tucker core of X for the first `a + 1` components, the
//!    inner regression of `u` on those scores, and the X model and Y
//!    prediction;
//! 5. replace the Y residual with `Y - prediction`.
//!
//! X itself is never deflated: loadings always come from the original X,
//! and the X residual only feeds the variance table.

use crate::config::NplsConfig;
use crate::error::{NplsError, NplsResult};
use crate::loading::{loading_update, Loadings};
use crate::model::NplsModel;
use npls_decomp::{
    tucker_core, CoreFactor, CoreProjection, CpAlsRankOne, LeadingScores, NipalsPca,
    RankOneDecomposer,
};
use npls_kernels::{
    fold_samples, has_missing, kronecker_modes, masked_sum_squares, outer_modes_vectorized,
    refold, unfold_samples,
};
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis};
use scirs2_core::random::{
    rngs::StdRng, thread_rng, Distribution, RandNormal as Normal, Rng, SeedableRng,
};
use scirs2_linalg::lstsq;
use tracing::{debug, info, warn};

/// N-way PLS estimator
///
/// Holds the configuration and the two pluggable collaborators: the
/// rank-one decomposition used by the loading update, and the score seeder
/// for multi-column responses.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, IxDyn};
/// use npls::{Npls, NplsConfig};
///
/// let x = Array::from_shape_fn(IxDyn(&[6, 3, 2]), |idx| {
///     (idx[0] as f64 + 1.0) * (idx[1] as f64 + 0.5) * (2.0 - idx[2] as f64)
/// });
/// let y = Array::from_shape_fn(IxDyn(&[6]), |idx| idx[0] as f64 + 1.0);
///
/// let model = Npls::new(NplsConfig::new(1).with_seed(1)).fit(&x, &y)?;
/// assert_eq!(model.x_factors.len(), 3);
/// assert_eq!(model.y_pred.shape(), &[6]);
/// # Ok::<(), npls::NplsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Npls<D = CpAlsRankOne, S = NipalsPca> {
    config: NplsConfig,
    decomposer: D,
    seeder: S,
}

impl Npls {
    /// Estimator with the default rank-one CP-ALS and NIPALS seeder.
    pub fn new(config: NplsConfig) -> Self {
        Self {
            config,
            decomposer: CpAlsRankOne::default(),
            seeder: NipalsPca::default(),
        }
    }
}

impl<D, S> Npls<D, S>
where
    D: RankOneDecomposer,
    S: LeadingScores,
{
    pub fn with_collaborators(config: NplsConfig, decomposer: D, seeder: S) -> Self {
        Self {
            config,
            decomposer,
            seeder,
        }
    }

    pub fn config(&self) -> &NplsConfig {
        &self.config
    }

    /// Fit the model, seeding the random start from the configured seed.
    ///
    /// `x` has samples along its first axis and at least one more mode; `y`
    /// has the same number of samples. A one-dimensional `y` is a single
    /// response column. Missing values are NaN.
    pub fn fit(&self, x: &ArrayD<f64>, y: &ArrayD<f64>) -> NplsResult<NplsModel> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(thread_rng().random::<u64>()),
        };
        self.fit_with_rng(x, y, &mut rng)
    }

    /// Fit the model drawing the random start vectors from `rng`.
    #[tracing::instrument(
        skip_all,
        fields(x_shape = ?x.shape(), y_shape = ?y.shape(), n_components = self.config.n_components)
    )]
    pub fn fit_with_rng<R>(&self, x: &ArrayD<f64>, y: &ArrayD<f64>, rng: &mut R) -> NplsResult<NplsModel>
    where
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        validate_inputs(x, y)?;

        let n_components = self.config.n_components;
        let x_shape = x.shape().to_vec();
        let y_shape = y.shape().to_vec();
        let x_modes = &x_shape[1..];
        let y_modes: Vec<usize> = if y_shape.len() == 1 {
            vec![1]
        } else {
            y_shape[1..].to_vec()
        };
        let n_samples = x_shape[0];
        let x_order = x_shape.len();
        let y_order = y_modes.len() + 1;

        let xu = unfold_samples(x)?;
        let yu = unfold_samples(y)?;

        let missing_x = has_missing(&xu.view());
        let missing_y = has_missing(&yu.view());
        if missing_x {
            info!("missing values in X are handled by masking");
        }
        if missing_y {
            info!("missing values in Y are handled by masking");
        }

        let ssx_total = masked_sum_squares(&xu.view());
        let ssy_total = masked_sum_squares(&yu.view());

        let mut t_scores = Array2::<f64>::zeros((n_samples, n_components));
        let mut u_scores = Array2::<f64>::zeros((n_samples, n_components));
        let mut w: Vec<Array2<f64>> = x_modes
            .iter()
            .map(|&d| Array2::zeros((d, n_components)))
            .collect();
        let mut q: Vec<Array2<f64>> = y_modes
            .iter()
            .map(|&d| Array2::zeros((d, n_components)))
            .collect();
        let mut q_kron = Array2::<f64>::zeros((yu.ncols(), n_components));
        let mut b = Array2::<f64>::zeros((n_components, n_components));

        let mut cores = Vec::with_capacity(n_components);
        let mut predictions = Vec::with_capacity(n_components);
        let mut ssx_residual = Vec::with_capacity(n_components);
        let mut ssy_residual = Vec::with_capacity(n_components);
        let mut iterations = Vec::with_capacity(n_components);

        let mut x_res = xu.clone();
        let mut y_res = yu.clone();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| NplsError::InvalidConfig(format!("standard normal: {:?}", e)))?;

        for a in 0..n_components {
            let u_start = if y_order == 2 && yu.ncols() == 1 {
                y_res.column(0).to_owned()
            } else {
                self.seeder.leading_scores(&y_res)?
            };
            let t_start: Array1<f64> = (0..n_samples).map(|_| normal.sample(&mut *rng)).collect();

            let (mut x_load, y_load, mut t, u, iters) = self.inner_loop(
                &xu, &y_res, x_modes, &y_modes, missing_x, missing_y, u_start, t_start,
            )?;
            iterations.push(iters);

            let corr = correlation(&t, &u);
            if self.config.sign_alignment.flips(corr) {
                t.mapv_inplace(|v| -v);
                x_load.modes[0].mapv_inplace(|v| -v);
            }

            t_scores.column_mut(a).assign(&t);
            check_new_scores(&t_scores.slice(s![.., ..=a]), a)?;
            u_scores.column_mut(a).assign(&u);
            q_kron.column_mut(a).assign(&y_load.kron);
            for (matrix, v) in w.iter_mut().zip(x_load.modes.iter()) {
                matrix.column_mut(a).assign(v);
            }
            for (matrix, v) in q.iter_mut().zip(y_load.modes.iter()) {
                matrix.column_mut(a).assign(v);
            }

            // Tucker core of the original X over the first a + 1 components
            let t_a = t_scores.slice(s![.., ..=a]).to_owned();
            let mut factors = Vec::with_capacity(x_order);
            factors.push(CoreFactor::Projection(t_a.clone()));
            factors.extend(
                w.iter()
                    .map(|m| CoreFactor::Projection(m.slice(s![.., ..=a]).to_owned())),
            );
            let core = tucker_core(x, &factors, CoreProjection::Oblique)?;

            let coefficients = inner_regression(&t_a, &u_scores.column(a))?;
            b.slice_mut(s![..=a, a]).assign(&coefficients);

            let w_views: Vec<ArrayView2<f64>> = w.iter().map(|m| m.slice(s![.., ..=a])).collect();
            let w_kron = kronecker_modes(&w_views)?;
            let x_model = t_a.dot(&unfold_samples(&core)?).dot(&w_kron.t());
            let y_pred = t_a
                .dot(&b.slice(s![..=a, ..=a]))
                .dot(&q_kron.slice(s![.., ..=a]).t());

            x_res = &xu - &x_model;
            y_res = &yu - &y_pred;

            let ssx = masked_sum_squares(&x_res.view());
            let ssy = masked_sum_squares(&y_res.view());
            debug!(
                component = a + 1,
                iterations = iters,
                ssx,
                ssy,
                explained_x = percent_explained(ssx, ssx_total),
                explained_y = percent_explained(ssy, ssy_total),
                "component extracted"
            );
            ssx_residual.push(ssx);
            ssy_residual.push(ssy);

            predictions.push(fold_samples(&y_pred, &y_shape)?);
            cores.push(core);
        }

        let reg = if y_order <= 2 {
            Some(regression_coefficients(&w, &q[0], &b, x_modes)?)
        } else {
            warn!(
                y_order,
                "regression coefficients are only computed for vector or two-way Y"
            );
            None
        };

        let y_pred = predictions[n_components - 1].clone();

        let mut x_factors = Vec::with_capacity(x_order);
        x_factors.push(t_scores);
        x_factors.extend(w);
        let mut y_factors = Vec::with_capacity(y_order);
        y_factors.push(u_scores);
        y_factors.extend(q);

        Ok(NplsModel {
            x_factors,
            y_factors,
            core: cores,
            b,
            y_pred,
            y_pred_by_component: predictions,
            ssx: variance_table(ssx_total, &ssx_residual),
            ssy: variance_table(ssy_total, &ssy_residual),
            reg,
            q_kron,
            x_residual: x_res,
            y_residual: y_res,
            missing_x,
            missing_y,
            iterations,
            x_shape,
            y_shape,
        })
    }

    /// Alternate X and Y loadings and scores until `t` settles.
    ///
    /// Returns the final loadings, scores and the iteration count.
    #[allow(clippy::too_many_arguments)]
    fn inner_loop(
        &self,
        xu: &Array2<f64>,
        y_res: &Array2<f64>,
        x_modes: &[usize],
        y_modes: &[usize],
        missing_x: bool,
        missing_y: bool,
        mut u: Array1<f64>,
        mut t_prev: Array1<f64>,
    ) -> NplsResult<(Loadings, Loadings, Array1<f64>, Array1<f64>, usize)> {
        let mut iters = 0;
        loop {
            let mask_x = missing_x || has_missing(&u.view());
            let x_load = loading_update(xu, &u.view(), x_modes, mask_x, &self.decomposer)?;
            let t = project_scores(xu, &x_load.kron, missing_x);

            let mask_y = missing_y || has_missing(&t.view());
            let y_load = loading_update(y_res, &t.view(), y_modes, mask_y, &self.decomposer)?;
            u = project_scores(y_res, &y_load.kron, missing_y);
            iters += 1;

            let change = norm(&(&t - &t_prev)) / norm(&t);
            // NaN ends the loop as well
            if !(change > self.config.tolerance) {
                return Ok((x_load, y_load, t, u, iters));
            }
            if iters >= self.config.max_iterations {
                warn!(
                    iterations = iters,
                    change, "inner loop hit the iteration cap; keeping the last iterate"
                );
                return Ok((x_load, y_load, t, u, iters));
            }
            t_prev = t;
        }
    }
}

fn validate_inputs(x: &ArrayD<f64>, y: &ArrayD<f64>) -> NplsResult<()> {
    if x.ndim() < 2 {
        return Err(NplsError::ShapeMismatch(format!(
            "X needs a sample mode and at least one variable mode, got shape {:?}",
            x.shape()
        )));
    }
    if y.ndim() < 1 {
        return Err(NplsError::ShapeMismatch(
            "Y needs at least a sample mode".to_string(),
        ));
    }
    if x.shape()[0] != y.shape()[0] {
        return Err(NplsError::ShapeMismatch(format!(
            "X has {} samples, Y has {}",
            x.shape()[0],
            y.shape()[0]
        )));
    }
    if x.shape().contains(&0) || y.shape().contains(&0) {
        return Err(NplsError::ShapeMismatch(format!(
            "empty mode in X {:?} or Y {:?}",
            x.shape(),
            y.shape()
        )));
    }
    Ok(())
}

/// Scores of a block against its loading Kronecker vector.
///
/// With missing data each row is regressed on the loadings of its present
/// columns only; a row with nothing present gives NaN.
fn project_scores(block: &Array2<f64>, kron: &Array1<f64>, missing: bool) -> Array1<f64> {
    if !missing {
        return block.dot(kron);
    }

    block
        .rows()
        .into_iter()
        .map(|row| {
            let mut num = 0.0;
            let mut den = 0.0;
            for (&x, &k) in row.iter().zip(kron.iter()) {
                if !x.is_nan() {
                    num += x * k;
                    den += k * k;
                }
            }
            num / den
        })
        .collect()
}

/// Reject a component whose X scores add no new direction.
///
/// Scores vanish when the response has no covariance with X (an all-zero
/// response gives NaN loadings), and they fall into the span of the earlier
/// scores once the component count exceeds the rank of X. Either way the
/// Tucker core and the inner regression would be singular. Rows with a
/// missing score are ignored.
fn check_new_scores(t: &ArrayView2<f64>, component: usize) -> NplsResult<()> {
    let degenerate = |reason: &str| NplsError::DegenerateComponent {
        component: component + 1,
        reason: reason.to_string(),
    };

    let rows: Vec<usize> = (0..t.nrows())
        .filter(|&i| t.row(i).iter().all(|v| v.is_finite()))
        .collect();
    let latest = t.column(component).select(Axis(0), &rows);
    let size = norm(&latest);
    if !(size > 0.0 && size.is_finite()) {
        return Err(degenerate("X scores vanish"));
    }
    if component == 0 {
        return Ok(());
    }
    if rows.len() <= component {
        return Err(degenerate("fewer complete score rows than components"));
    }

    let earlier = t.slice(s![.., ..component]).select(Axis(0), &rows);
    let fit = lstsq(&earlier.view(), &latest.view(), None)?;
    let residual = &latest - &earlier.dot(&fit.x);
    if norm(&residual) <= RANK_TOLERANCE * size {
        return Err(degenerate(
            "X scores lie in the span of earlier components; X has lower rank than the component count",
        ));
    }
    Ok(())
}

/// Relative residual below which new scores count as linearly dependent
const RANK_TOLERANCE: f64 = 1e-8;

/// Least-squares fit of `u` on the columns of `t`, over the rows where
/// both are present.
fn inner_regression(t: &Array2<f64>, u: &ArrayView1<f64>) -> NplsResult<Array1<f64>> {
    let rows: Vec<usize> = (0..u.len())
        .filter(|&i| !u[i].is_nan() && t.row(i).iter().all(|v| !v.is_nan()))
        .collect();

    let fit = if rows.len() == u.len() {
        lstsq(&t.view(), u, None)?
    } else {
        let t_valid = t.select(Axis(0), &rows);
        let u_valid = u.select(Axis(0), &rows);
        lstsq(&t_valid.view(), &u_valid.view(), None)?
    };
    Ok(fit.x)
}

/// Regression coefficients per response column and component count, in
/// the predictor shape (`[J, 1]` for a two-way X).
fn regression_coefficients(
    w: &[Array2<f64>],
    q: &Array2<f64>,
    b: &Array2<f64>,
    x_modes: &[usize],
) -> NplsResult<Vec<Vec<ArrayD<f64>>>> {
    let n_components = b.ncols();
    let views: Vec<ArrayView2<f64>> = w.iter().map(|m| m.view()).collect();
    let r = outer_modes_vectorized(&views, None)?;

    let shape = if x_modes.len() == 1 {
        vec![x_modes[0], 1]
    } else {
        x_modes.to_vec()
    };

    let mut reg = Vec::with_capacity(q.nrows());
    for iy in 0..q.nrows() {
        let mut per_component = Vec::with_capacity(n_components);
        for a in 0..n_components {
            let coefficients = r
                .slice(s![.., ..=a])
                .dot(&b.slice(s![..=a, ..=a]))
                .dot(&q.slice(s![iy, ..=a]));
            per_component.push(refold(&coefficients.to_vec(), &shape)?);
        }
        reg.push(per_component);
    }
    Ok(reg)
}

/// Rows `[total, 0]` then `[residual, percent explained]` per component.
fn variance_table(total: f64, residuals: &[f64]) -> Array2<f64> {
    let mut table = Array2::<f64>::zeros((residuals.len() + 1, 2));
    table[[0, 0]] = total;
    for (k, &ss) in residuals.iter().enumerate() {
        table[[k + 1, 0]] = ss;
        table[[k + 1, 1]] = percent_explained(ss, total);
    }
    table
}

#[inline]
fn percent_explained(residual: f64, total: f64) -> f64 {
    100.0 * (1.0 - residual / total)
}

#[inline]
fn norm(v: &Array1<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Pearson correlation; NaN when either vector is constant.
fn correlation(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    cov / (var_a * var_b).sqrt()
}
