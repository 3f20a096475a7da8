//! Property-based tests for the N-way PLS decompositions
//!
//! These tests use proptest to verify properties that should hold for any
//! well-formed input.

#[cfg(test)]
mod tests {
    use crate::{pseudo_inverse, tucker_core, CoreFactor, CoreProjection, CpAlsRankOne, RankOneDecomposer};
    use proptest::prelude::*;
    use scirs2_core::ndarray_ext::{Array, Array1, Array2, Dimension, IxDyn};

    // Decompositions run iterative solvers per case; keep the case count low
    fn proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        }
    }

    fn nonzero_vector(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.2f64..3.0, len)
    }

    fn abs_cosine(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        a.dot(b).abs() / (a.dot(a).sqrt() * b.dot(b).sqrt())
    }

    // Property: a rank-one array is reconstructed exactly
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn rank_one_input_is_recovered(
            a in nonzero_vector(1..5),
            b in nonzero_vector(1..5),
            c in nonzero_vector(1..5),
            flip in any::<bool>(),
        ) {
            let sign = if flip { -1.0 } else { 1.0 };
            let (a, b, c) = (Array1::from(a), Array1::from(b), Array1::from(c));
            let shape = [a.len(), b.len(), c.len()];
            let w = Array::from_shape_fn(IxDyn(&shape), |idx| sign * a[idx[0]] * b[idx[1]] * c[idx[2]]);

            let f = CpAlsRankOne::default().decompose(&w).unwrap();
            prop_assert_eq!(f.len(), 3);
            prop_assert!((abs_cosine(&f[0], &a) - 1.0).abs() < 1e-9);
            prop_assert!((abs_cosine(&f[1], &b) - 1.0).abs() < 1e-9);
            prop_assert!((abs_cosine(&f[2], &c) - 1.0).abs() < 1e-9);

            for (idx, &val) in w.indexed_iter() {
                let approx = f[0][idx[0]] * f[1][idx[1]] * f[2][idx[2]];
                prop_assert!((approx - val).abs() < 1e-8 * (1.0 + val.abs()));
            }
        }
    }

    // Property: A · pinv(A) · A = A
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn pseudo_inverse_reproduces_matrix(
            (rows, cols, data) in (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
                (Just(r), Just(c), prop::collection::vec(-5.0f64..5.0, r * c))
            })
        ) {
            let a = Array2::from_shape_vec((rows, cols), data).unwrap();
            let p = pseudo_inverse(&a).unwrap();
            prop_assert_eq!(p.shape(), &[cols, rows]);

            let apa = a.dot(&p).dot(&a);
            for (x, y) in apa.iter().zip(a.iter()) {
                prop_assert!((x - y).abs() < 1e-8 * (1.0 + y.abs()));
            }
        }
    }

    // Property: pass-through modes leave their dimension untouched
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn pass_through_preserves_dimension(
            dims in prop::collection::vec(1usize..4, 2..4),
            keep in any::<prop::sample::Index>(),
        ) {
            let x = Array::from_shape_fn(IxDyn(&dims), |idx| {
                (0..idx.ndim()).map(|d| (idx[d] + d + 1) as f64).product::<f64>()
            });
            let keep = keep.index(dims.len());
            let factors: Vec<CoreFactor> = dims
                .iter()
                .enumerate()
                .map(|(mode, &d)| {
                    if mode == keep {
                        CoreFactor::PassThrough
                    } else {
                        CoreFactor::Projection(Array2::from_elem((d, 1), 1.0 / (d as f64).sqrt()))
                    }
                })
                .collect();

            for projection in [CoreProjection::Orthogonal, CoreProjection::Oblique] {
                let core = tucker_core(&x, &factors, projection).unwrap();
                for (mode, &d) in dims.iter().enumerate() {
                    let expected = if mode == keep { d } else { 1 };
                    prop_assert_eq!(core.shape()[mode], expected);
                }
            }
        }
    }
}
