//! Kernel parity: every compiled kernel variant against naive reference
//! loops at lane-boundary sizes.
//!
//! All built-in variants are runnable on the architecture they compile for
//! (SSE2 and NEON are baseline, AVX2 guards itself), so every Entry in the
//! link-time slice is checked, not only the one the host would select.

use vecmath::{Entry, Registry};

const SIZES: &[usize] = &[
    0, 1, 2, 3, 4, 5, 7, 8, 15, 16, 17, 31, 32, 33, 63, 64, 100, 1000, 1023, 1024, 1025,
];

fn entries() -> Vec<Entry> {
    let entries = Registry::with_builtin_kernels().entries_by_priority();
    assert!(entries.iter().any(|e| e.name == "generic"));
    entries
}

/// Deterministic values in [-scale, scale), including exact zeros.
fn gen(n: usize, seed: u32, scale: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let v = (i as u32).wrapping_add(seed).wrapping_mul(2654435761) >> 16;
            if v % 17 == 0 {
                0.0
            } else {
                ((v % 2000) as f64 / 1000.0 - 1.0) * scale
            }
        })
        .collect()
}

fn reduction_tol(terms: impl Iterator<Item = f64>) -> f64 {
    1e-9 * terms.map(f64::abs).sum::<f64>().max(1.0)
}

// ───────────────────── Elementwise ─────────────────────

#[test]
fn elementwise_matches_reference_at_boundary_sizes() {
    for entry in entries() {
        let ops = entry.ops;
        for &n in SIZES {
            let a = gen(n, 1, 100.0);
            let b = gen(n, 2, 3.0);
            let c = gen(n, 3, 50.0);
            let ctx = format!("{} n={n}", entry.name);
            let mut dst = vec![f64::NAN; n];

            (ops.add_block.unwrap())(&mut dst, &a, &b);
            let want: Vec<f64> = (0..n).map(|i| a[i] + b[i]).collect();
            assert_eq!(dst, want, "add_block {ctx}");

            (ops.mul_block.unwrap())(&mut dst, &a, &b);
            let want: Vec<f64> = (0..n).map(|i| a[i] * b[i]).collect();
            assert_eq!(dst, want, "mul_block {ctx}");

            (ops.scale_block.unwrap())(&mut dst, &a, -0.75);
            let want: Vec<f64> = (0..n).map(|i| a[i] * -0.75).collect();
            assert_eq!(dst, want, "scale_block {ctx}");

            (ops.add_mul_block.unwrap())(&mut dst, &a, &b, 1.5);
            let want: Vec<f64> = (0..n).map(|i| (a[i] + b[i]) * 1.5).collect();
            assert_eq!(dst, want, "add_mul_block {ctx}");

            (ops.mul_add_block.unwrap())(&mut dst, &a, &b, &c);
            let want: Vec<f64> = (0..n).map(|i| a[i] * b[i] + c[i]).collect();
            assert_eq!(dst, want, "mul_add_block {ctx}");
        }
    }
}

#[test]
fn in_place_matches_reference_at_boundary_sizes() {
    for entry in entries() {
        let ops = entry.ops;
        for &n in SIZES {
            let a = gen(n, 4, 10.0);
            let b = gen(n, 5, 10.0);
            let ctx = format!("{} n={n}", entry.name);

            let mut dst = a.clone();
            (ops.add_block_in_place.unwrap())(&mut dst, &b);
            let want: Vec<f64> = (0..n).map(|i| a[i] + b[i]).collect();
            assert_eq!(dst, want, "add_block_in_place {ctx}");

            let mut dst = a.clone();
            (ops.mul_block_in_place.unwrap())(&mut dst, &b);
            let want: Vec<f64> = (0..n).map(|i| a[i] * b[i]).collect();
            assert_eq!(dst, want, "mul_block_in_place {ctx}");

            let mut dst = a.clone();
            (ops.scale_block_in_place.unwrap())(&mut dst, 3.25);
            let want: Vec<f64> = (0..n).map(|i| a[i] * 3.25).collect();
            assert_eq!(dst, want, "scale_block_in_place {ctx}");
        }
    }
}

#[test]
fn magnitude_and_power_at_boundary_sizes() {
    for entry in entries() {
        let ops = entry.ops;
        for &n in SIZES {
            let re = gen(n, 6, 20.0);
            let im = gen(n, 7, 20.0);
            let ctx = format!("{} n={n}", entry.name);
            let mut pow = vec![0.0; n];
            let mut mag = vec![0.0; n];

            (ops.power.unwrap())(&mut pow, &re, &im);
            (ops.magnitude.unwrap())(&mut mag, &re, &im);
            for i in 0..n {
                assert_eq!(pow[i], re[i] * re[i] + im[i] * im[i], "power[{i}] {ctx}");
                assert_eq!(mag[i], pow[i].sqrt(), "magnitude[{i}] {ctx}");
            }
        }
    }
}

// ───────────────────── Reductions ─────────────────────

#[test]
fn reductions_match_reference_at_boundary_sizes() {
    for entry in entries() {
        let ops = entry.ops;
        for &n in SIZES {
            let a = gen(n, 8, 1000.0);
            let b = gen(n, 9, 0.01);
            let ctx = format!("{} n={n}", entry.name);

            let want = a.iter().fold(0.0, |acc, &v| acc + v);
            let got = (ops.sum.unwrap())(&a);
            assert!(
                (got - want).abs() <= reduction_tol(a.iter().copied()),
                "sum {ctx}: {got} vs {want}"
            );

            let want = a.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
            assert_eq!((ops.max_abs.unwrap())(&a), want, "max_abs {ctx}");

            let want = (0..n).fold(0.0, |acc, i| acc + a[i] * b[i]);
            let got = (ops.dot_product.unwrap())(&a, &b);
            assert!(
                (got - want).abs() <= reduction_tol((0..n).map(|i| a[i] * b[i])),
                "dot_product {ctx}: {got} vs {want}"
            );
        }
    }
}

#[test]
fn empty_reductions_are_zero() {
    for entry in entries() {
        let ops = entry.ops;
        assert_eq!((ops.sum.unwrap())(&[]), 0.0, "{}", entry.name);
        assert_eq!((ops.max_abs.unwrap())(&[]), 0.0, "{}", entry.name);
        assert_eq!((ops.dot_product.unwrap())(&[1.0, 2.0], &[]), 0.0, "{}", entry.name);
        assert_eq!((ops.dot_product.unwrap())(&[], &[]), 0.0, "{}", entry.name);
    }
}

#[test]
fn dot_product_uses_shorter_operand() {
    for entry in entries() {
        let dot = entry.ops.dot_product.unwrap();
        for &n in SIZES {
            let a = gen(n + 5, 10, 4.0);
            let b = gen(n, 11, 4.0);
            let want = (0..n).fold(0.0, |acc, i| acc + a[i] * b[i]);
            let tol = reduction_tol((0..n).map(|i| a[i] * b[i]));
            assert!((dot(&a, &b) - want).abs() <= tol, "{} n={n}", entry.name);
            assert!((dot(&b, &a) - want).abs() <= tol, "{} n={n} swapped", entry.name);
        }
    }
}

// ───────────────────── Literal vectors ─────────────────────

#[test]
fn magnitude_power_literal_vectors() {
    let re = [3.0, -1.0, 0.0];
    let im = [4.0, -1.0, 0.0];
    for entry in entries() {
        let mut pow = [0.0; 3];
        let mut mag = [0.0; 3];
        (entry.ops.power.unwrap())(&mut pow, &re, &im);
        (entry.ops.magnitude.unwrap())(&mut mag, &re, &im);
        assert_eq!(pow, [25.0, 2.0, 0.0], "{}", entry.name);
        assert_eq!(mag, [5.0, 2f64.sqrt(), 0.0], "{}", entry.name);
    }

    let mut pow = [0.0; 3];
    let mut mag = [0.0; 3];
    vecmath::power(&mut pow, &re, &im);
    vecmath::magnitude(&mut mag, &re, &im);
    assert_eq!(pow, [25.0, 2.0, 0.0]);
    assert_eq!(mag, [5.0, 2f64.sqrt(), 0.0]);
}

#[test]
fn public_ops_on_empty_slices() {
    let mut dst: Vec<f64> = Vec::new();
    vecmath::add_block(&mut dst, &[], &[]);
    vecmath::mul_add_block(&mut dst, &[], &[], &[]);
    vecmath::scale_block_in_place(&mut dst, 2.0);
    assert_eq!(vecmath::sum(&[]), 0.0);
    assert_eq!(vecmath::max_abs(&[]), 0.0);
    assert_eq!(vecmath::dot_product(&[1.0], &[]), 0.0);
}
