//! Portable scalar kernels.
//!
//! The reference every vector variant must match: elementwise results bit
//! for bit, reductions within reassociation error.

use dsp_cpu::SimdLevel;
use linkme::distributed_slice;

use super::assert_len;
use crate::registry::KERNELS;
use crate::table::{Entry, Operations};

pub const NAME: &str = "generic";
pub const PRIORITY: i32 = 0;

pub const OPS: Operations = Operations {
    add_block: Some(add_block),
    add_block_in_place: Some(add_block_in_place),
    mul_block: Some(mul_block),
    mul_block_in_place: Some(mul_block_in_place),
    scale_block: Some(scale_block),
    scale_block_in_place: Some(scale_block_in_place),
    add_mul_block: Some(add_mul_block),
    mul_add_block: Some(mul_add_block),
    max_abs: Some(max_abs),
    sum: Some(sum),
    dot_product: Some(dot_product),
    magnitude: Some(magnitude),
    power: Some(power),
};

pub const ENTRY: Entry = Entry {
    name: NAME,
    level: SimdLevel::None,
    priority: PRIORITY,
    ops: OPS,
};

#[distributed_slice(KERNELS)]
static GENERIC_ENTRY: Entry = ENTRY;

/// `dst[i] = a[i] + b[i]`
pub fn add_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("add_block", dst.len(), &[a.len(), b.len()]);
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x + y;
    }
}

/// `dst[i] += src[i]`
pub fn add_block_in_place(dst: &mut [f64], src: &[f64]) {
    assert_len("add_block_in_place", dst.len(), &[src.len()]);
    for (d, &x) in dst.iter_mut().zip(src) {
        *d += x;
    }
}

/// `dst[i] = a[i] * b[i]`
pub fn mul_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("mul_block", dst.len(), &[a.len(), b.len()]);
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x * y;
    }
}

/// `dst[i] *= src[i]`
pub fn mul_block_in_place(dst: &mut [f64], src: &[f64]) {
    assert_len("mul_block_in_place", dst.len(), &[src.len()]);
    for (d, &x) in dst.iter_mut().zip(src) {
        *d *= x;
    }
}

/// `dst[i] = a[i] * scale`
pub fn scale_block(dst: &mut [f64], a: &[f64], scale: f64) {
    assert_len("scale_block", dst.len(), &[a.len()]);
    for (d, &x) in dst.iter_mut().zip(a) {
        *d = x * scale;
    }
}

/// `dst[i] *= scale`
pub fn scale_block_in_place(dst: &mut [f64], scale: f64) {
    for d in dst.iter_mut() {
        *d *= scale;
    }
}

/// `dst[i] = (a[i] + b[i]) * scale`
pub fn add_mul_block(dst: &mut [f64], a: &[f64], b: &[f64], scale: f64) {
    assert_len("add_mul_block", dst.len(), &[a.len(), b.len()]);
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = (x + y) * scale;
    }
}

/// `dst[i] = a[i] * b[i] + c[i]`, rounded after the multiply (no FMA).
pub fn mul_add_block(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64]) {
    assert_len("mul_add_block", dst.len(), &[a.len(), b.len(), c.len()]);
    for (((d, &x), &y), &z) in dst.iter_mut().zip(a).zip(b).zip(c) {
        *d = x * y + z;
    }
}

/// Largest `|x[i]|`, 0 for empty input. NaN elements are skipped.
pub fn max_abs(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |m, &v| {
        let v = v.abs();
        if v > m {
            v
        } else {
            m
        }
    })
}

/// Left-to-right sum, 0 for empty input.
pub fn sum(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |acc, &v| acc + v)
}

/// Dot product over the first `min(a.len(), b.len())` elements.
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).fold(0.0, |acc, (&x, &y)| acc + x * y)
}

/// `dst[i] = sqrt(re[i]² + im[i]²)`
pub fn magnitude(dst: &mut [f64], re: &[f64], im: &[f64]) {
    assert_len("magnitude", dst.len(), &[re.len(), im.len()]);
    for ((d, &r), &i) in dst.iter_mut().zip(re).zip(im) {
        *d = (r * r + i * i).sqrt();
    }
}

/// `dst[i] = re[i]² + im[i]²`
pub fn power(dst: &mut [f64], re: &[f64], im: &[f64]) {
    assert_len("power", dst.len(), &[re.len(), im.len()]);
    for ((d, &r), &i) in dst.iter_mut().zip(re).zip(im) {
        *d = r * r + i * i;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let mut dst = [0.0; 3];

        add_block(&mut dst, &a, &b);
        assert_eq!(dst, [5.0, 7.0, 9.0]);

        mul_block(&mut dst, &a, &b);
        assert_eq!(dst, [4.0, 10.0, 18.0]);

        scale_block(&mut dst, &a, 0.5);
        assert_eq!(dst, [0.5, 1.0, 1.5]);

        add_mul_block(&mut dst, &a, &b, 2.0);
        assert_eq!(dst, [10.0, 14.0, 18.0]);

        mul_add_block(&mut dst, &a, &b, &[1.0, 1.0, 1.0]);
        assert_eq!(dst, [5.0, 11.0, 19.0]);
    }

    #[test]
    fn test_in_place() {
        let mut dst = [1.0, 2.0, 3.0];
        add_block_in_place(&mut dst, &[1.0, 1.0, 1.0]);
        assert_eq!(dst, [2.0, 3.0, 4.0]);
        mul_block_in_place(&mut dst, &[2.0, 0.5, -1.0]);
        assert_eq!(dst, [4.0, 1.5, -4.0]);
        scale_block_in_place(&mut dst, -2.0);
        assert_eq!(dst, [-8.0, -3.0, 8.0]);
    }

    #[test]
    fn test_reductions() {
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(max_abs(&[]), 0.0);
        assert_eq!(dot_product(&[1.0, 2.0], &[]), 0.0);

        assert_eq!(sum(&[1.0, -2.0, 3.5]), 2.5);
        assert_eq!(max_abs(&[1.0, -7.0, 3.0]), 7.0);
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_dot_product_uses_shorter_operand() {
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[1.0, 1.0]), 3.0);
        assert_eq!(dot_product(&[2.0], &[3.0, 100.0]), 6.0);
    }

    #[test]
    fn test_max_abs_skips_nan() {
        assert_eq!(max_abs(&[f64::NAN, -3.0, 2.0]), 3.0);
    }

    #[test]
    fn test_magnitude_power() {
        let re = [3.0, -1.0, 0.0];
        let im = [4.0, -1.0, 0.0];
        let mut p = [0.0; 3];
        let mut m = [0.0; 3];
        power(&mut p, &re, &im);
        magnitude(&mut m, &re, &im);
        assert_eq!(p, [25.0, 2.0, 0.0]);
        assert_eq!(m, [5.0, 2f64.sqrt(), 0.0]);
        for i in 0..3 {
            assert_eq!(m[i], p[i].sqrt());
        }
    }

    #[test]
    fn test_empty_is_noop() {
        let mut dst: [f64; 0] = [];
        add_block(&mut dst, &[], &[]);
        mul_add_block(&mut dst, &[], &[], &[]);
        power(&mut dst, &[], &[]);
    }

    #[test]
    #[should_panic(expected = "add_block: slice length mismatch")]
    fn test_length_mismatch_panics() {
        let mut dst = [0.0; 3];
        add_block(&mut dst, &[1.0, 2.0, 3.0], &[1.0, 2.0]);
    }

    #[test]
    fn test_length_mismatch_leaves_dst() {
        let mut dst = [9.0; 3];
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            mul_add_block(&mut dst, &[1.0; 3], &[1.0; 3], &[1.0; 2]);
        }));
        assert!(result.is_err());
        assert_eq!(dst, [9.0; 3]);
    }

    #[test]
    fn test_entry_complete() {
        assert!(ENTRY.ops.is_complete());
        assert_eq!(ENTRY.level, SimdLevel::None);
    }
}
