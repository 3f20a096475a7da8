//! Integration tests for the N-way PLS decompositions
//!
//! These tests combine the kernels with the decompositions the way the
//! engine does: rank-one CP of a reshaped cross product, Tucker cores of
//! loading models and score seeding for multi-column responses.

use npls_decomp::{
    tucker_core, CoreFactor, CoreProjection, CpAlsRankOne, LeadingScores, NipalsPca,
    RankOneDecomposer,
};
use npls_kernels::{kronecker_modes_vectors, refold, unfold_samples};
use scirs2_core::ndarray_ext::{array, Array, Array1, Array2, IxDyn};

fn unit(v: &Array1<f64>) -> Array1<f64> {
    let n = v.dot(v).sqrt();
    v.mapv(|x| x / n)
}

#[test]
fn test_rank_one_of_reshaped_cross_product() -> anyhow::Result<()> {
    // X = t ∘ a ∘ b, so X^T t reshapes to a rank-one (J1, J2) matrix
    let t = array![1.0, 2.0, -1.0, 0.5, 3.0];
    let a = array![0.3, 1.2, -0.7];
    let b = array![2.0, -1.0, 0.5, 1.5];
    let x = Array::from_shape_fn(IxDyn(&[5, 3, 4]), |idx| t[idx[0]] * a[idx[1]] * b[idx[2]]);

    let unfolded = unfold_samples(&x)?;
    let w = unfolded.t().dot(&t);
    let reshaped = refold(&w.to_vec(), &[3, 4])?;

    let f = CpAlsRankOne::default().decompose(&reshaped)?;
    let (fa, fb) = (unit(&f[0]), unit(&f[1]));
    assert!((fa.dot(&unit(&a)).abs() - 1.0).abs() < 1e-10);
    assert!((fb.dot(&unit(&b)).abs() - 1.0).abs() < 1e-10);

    // The Kronecker of the mode vectors lines up with the unfolding columns.
    let kron = kronecker_modes_vectors(&[fa.view(), fb.view()])?;
    let scores = unfolded.dot(&kron);
    let cos = scores.dot(&t).abs() / (scores.dot(&scores).sqrt() * t.dot(&t).sqrt());
    assert!((cos - 1.0).abs() < 1e-10);
    Ok(())
}

#[test]
fn test_oblique_core_reproduces_trilinear_model() -> anyhow::Result<()> {
    // Two-component model with non-orthogonal factors and a full core
    let t = array![[1.0, 0.2], [0.5, 1.0], [-1.0, 0.3], [2.0, -0.4]];
    let w1 = array![[0.8, 0.1], [0.6, 0.9], [0.0, 0.4]];
    let w2 = array![[1.0, 0.5], [0.2, 1.0]];
    let g = Array::from_shape_fn(IxDyn(&[2, 2, 2]), |idx| {
        1.0 + idx[0] as f64 - 0.5 * idx[1] as f64 + 0.25 * idx[2] as f64
    });

    let x = Array::from_shape_fn(IxDyn(&[4, 3, 2]), |idx| {
        let mut v = 0.0;
        for (r, gv) in g.indexed_iter() {
            v += gv * t[[idx[0], r[0]]] * w1[[idx[1], r[1]]] * w2[[idx[2], r[2]]];
        }
        v
    });

    let factors = vec![
        CoreFactor::Projection(t),
        CoreFactor::Projection(w1),
        CoreFactor::Projection(w2),
    ];
    let core = tucker_core(&x, &factors, CoreProjection::Oblique)?;
    assert_eq!(core.shape(), &[2, 2, 2]);
    for (c, e) in core.iter().zip(g.iter()) {
        assert!((c - e).abs() < 1e-9, "{} vs {}", c, e);
    }
    Ok(())
}

#[test]
fn test_tucker2_core_keeps_uncompressed_mode() -> anyhow::Result<()> {
    let x = Array::from_shape_fn(IxDyn(&[4, 5, 3]), |idx| {
        ((idx[0] + 1) * (idx[1] + 2)) as f64 - idx[2] as f64
    });
    let factors = vec![
        CoreFactor::Projection(Array2::from_elem((4, 2), 0.5)),
        CoreFactor::PassThrough,
        CoreFactor::Projection(Array2::from_elem((3, 1), 1.0)),
    ];

    let orth = tucker_core(&x, &factors, CoreProjection::Orthogonal)?;
    assert_eq!(orth.shape(), &[2, 5, 1]);

    // Uncompressed mode: core[r, j, 0] = 0.5 * sum_i sum_k x[i, j, k]
    for j in 0..5 {
        let expected: f64 = (0..4)
            .flat_map(|i| (0..3).map(move |k| (i, k)))
            .map(|(i, k)| 0.5 * x[[i, j, k]])
            .sum();
        assert!((orth[[0, j, 0]] - expected).abs() < 1e-10);
    }
    Ok(())
}

#[test]
fn test_scores_seed_multi_column_response() -> anyhow::Result<()> {
    let t = array![0.5, -1.0, 2.0, 1.5, -0.5, 1.0];
    let q = array![1.0, -2.0, 0.5];
    let mut y = Array2::from_shape_fn((6, 3), |(i, k)| t[i] * q[k]);
    y[[2, 1]] = f64::NAN;

    let scores = NipalsPca::default().leading_scores(&y)?;
    assert_eq!(scores.len(), 6);
    let cos = scores.dot(&t).abs() / (scores.dot(&scores).sqrt() * t.dot(&t).sqrt());
    assert!((cos - 1.0).abs() < 1e-8);
    Ok(())
}
