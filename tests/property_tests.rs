//! Property-based parity tests using proptest.
//!
//! For arbitrary inputs, every compiled kernel variant must:
//! - match the generic kernel bit for bit on elementwise operations
//! - match it within 1e-9 relative (scaled by the absolute term sum) on
//!   reductions, where vector tiers reassociate

use proptest::prelude::*;
use vecmath::kernels::generic;
use vecmath::{Entry, Registry};

fn variants() -> Vec<Entry> {
    Registry::with_builtin_kernels()
        .list_entries()
        .into_iter()
        .filter(|e| e.name != generic::NAME)
        .collect()
}

fn close(got: f64, want: f64, terms: impl Iterator<Item = f64>) -> bool {
    let scale = terms.map(f64::abs).sum::<f64>().max(1.0);
    (got - want).abs() <= 1e-9 * scale
}

/// Three equal-length operand vectors.
fn operands() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Vec<f64>)> {
    (0usize..200).prop_flat_map(|n| {
        (
            prop::collection::vec(-1e6f64..1e6, n),
            prop::collection::vec(-1e6f64..1e6, n),
            prop::collection::vec(-1e3f64..1e3, n),
        )
    })
}

proptest! {
    /// Property: elementwise kernels equal generic exactly.
    #[test]
    fn elementwise_equals_generic((a, b, c) in operands(), scale in -1e3f64..1e3) {
        let n = a.len();
        let mut want = vec![0.0; n];
        let mut got = vec![0.0; n];

        for entry in variants() {
            let ops = entry.ops;

            generic::add_block(&mut want, &a, &b);
            (ops.add_block.unwrap())(&mut got, &a, &b);
            prop_assert_eq!(&got, &want, "add_block {}", entry.name);

            generic::mul_block(&mut want, &a, &b);
            (ops.mul_block.unwrap())(&mut got, &a, &b);
            prop_assert_eq!(&got, &want, "mul_block {}", entry.name);

            generic::scale_block(&mut want, &a, scale);
            (ops.scale_block.unwrap())(&mut got, &a, scale);
            prop_assert_eq!(&got, &want, "scale_block {}", entry.name);

            generic::add_mul_block(&mut want, &a, &b, scale);
            (ops.add_mul_block.unwrap())(&mut got, &a, &b, scale);
            prop_assert_eq!(&got, &want, "add_mul_block {}", entry.name);

            generic::mul_add_block(&mut want, &a, &b, &c);
            (ops.mul_add_block.unwrap())(&mut got, &a, &b, &c);
            prop_assert_eq!(&got, &want, "mul_add_block {}", entry.name);

            generic::magnitude(&mut want, &a, &c);
            (ops.magnitude.unwrap())(&mut got, &a, &c);
            prop_assert_eq!(&got, &want, "magnitude {}", entry.name);

            generic::power(&mut want, &a, &c);
            (ops.power.unwrap())(&mut got, &a, &c);
            prop_assert_eq!(&got, &want, "power {}", entry.name);
        }
    }

    /// Property: in-place variants equal their out-of-place generic forms.
    #[test]
    fn in_place_equals_generic((a, b, _c) in operands(), scale in -10.0f64..10.0) {
        for entry in variants() {
            let ops = entry.ops;
            let mut want = vec![0.0; a.len()];

            let mut got = a.clone();
            generic::add_block(&mut want, &a, &b);
            (ops.add_block_in_place.unwrap())(&mut got, &b);
            prop_assert_eq!(&got, &want, "add_block_in_place {}", entry.name);

            let mut got = a.clone();
            generic::mul_block(&mut want, &a, &b);
            (ops.mul_block_in_place.unwrap())(&mut got, &b);
            prop_assert_eq!(&got, &want, "mul_block_in_place {}", entry.name);

            let mut got = a.clone();
            generic::scale_block(&mut want, &a, scale);
            (ops.scale_block_in_place.unwrap())(&mut got, scale);
            prop_assert_eq!(&got, &want, "scale_block_in_place {}", entry.name);
        }
    }

    /// Property: reductions stay within reassociation error of generic.
    #[test]
    fn reductions_close_to_generic(
        a in prop::collection::vec(-1e6f64..1e6, 0..300),
        b in prop::collection::vec(-1e3f64..1e3, 0..300),
    ) {
        for entry in variants() {
            let ops = entry.ops;

            let got = (ops.sum.unwrap())(&a);
            let want = generic::sum(&a);
            prop_assert!(close(got, want, a.iter().copied()), "sum {}: {} vs {}", entry.name, got, want);

            prop_assert_eq!((ops.max_abs.unwrap())(&a), generic::max_abs(&a), "max_abs {}", entry.name);

            let got = (ops.dot_product.unwrap())(&a, &b);
            let want = generic::dot_product(&a, &b);
            let terms = a.iter().zip(&b).map(|(x, y)| x * y);
            prop_assert!(close(got, want, terms), "dot_product {}: {} vs {}", entry.name, got, want);
        }
    }

    /// Property: magnitude is exactly the square root of power.
    #[test]
    fn magnitude_is_sqrt_of_power((re, im, _c) in operands()) {
        let mut pow = vec![0.0; re.len()];
        let mut mag = vec![0.0; re.len()];
        vecmath::power(&mut pow, &re, &im);
        vecmath::magnitude(&mut mag, &re, &im);
        for i in 0..re.len() {
            prop_assert_eq!(mag[i], pow[i].sqrt());
        }
    }
}
