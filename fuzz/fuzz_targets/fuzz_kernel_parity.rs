//! Fuzz target for kernel parity.
//!
//! Tests for:
//! - Memory safety on arbitrary lengths (no out-of-bounds in vector bodies)
//! - Elementwise parity with the generic kernel
//! - dot_product on operands of different lengths

#![no_main]

use libfuzzer_sys::fuzz_target;
use vecmath::kernels::generic;
use vecmath::Registry;

fn same(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_bits() == y.to_bits() || (x.is_nan() && y.is_nan()))
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let split = data[0] as usize;
    let values: Vec<f64> = data[1..]
        .chunks_exact(8)
        .map(|c| {
            let v = f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]);
            if v.is_finite() {
                v
            } else {
                0.0
            }
        })
        .collect();
    let half = values.len() / 2;
    let (a, b) = values.split_at(half);
    let b = &b[..half];

    for entry in Registry::with_builtin_kernels().list_entries() {
        let ops = entry.ops;
        let mut want = vec![0.0; half];
        let mut got = vec![0.0; half];

        generic::mul_add_block(&mut want, a, b, a);
        (ops.mul_add_block.unwrap())(&mut got, a, b, a);
        assert!(same(&got, &want), "{} mul_add_block", entry.name);

        generic::power(&mut want, a, b);
        (ops.power.unwrap())(&mut got, a, b);
        assert!(same(&got, &want), "{} power", entry.name);

        generic::magnitude(&mut want, a, b);
        (ops.magnitude.unwrap())(&mut got, a, b);
        assert!(same(&got, &want), "{} magnitude", entry.name);

        // Uneven operands: only memory safety and the empty identity matter.
        let short = &b[..split.min(b.len())];
        let dot = (ops.dot_product.unwrap())(a, short);
        if short.is_empty() {
            assert_eq!(dot, 0.0);
        }
        let _ = (ops.sum.unwrap())(a);
        let _ = (ops.max_abs.unwrap())(a);
    }
});
