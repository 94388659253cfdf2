//! NEON kernels: 2 × f64 per register.
//!
//! NEON is mandatory on aarch64 targets, so these need no runtime guard.

use std::arch::aarch64::*;

use dsp_cpu::SimdLevel;
use linkme::distributed_slice;

use super::assert_len;
use crate::registry::KERNELS;
use crate::table::{Entry, Operations};

pub const NAME: &str = "neon";
pub const PRIORITY: i32 = 15;
pub const LANES: usize = 2;

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
    level: SimdLevel::Neon,
    priority: PRIORITY,
    ops: OPS,
};

#[distributed_slice(KERNELS)]
static NEON_ENTRY: Entry = ENTRY;

#[inline]
fn split(len: usize) -> usize {
    len - len % LANES
}

pub fn add_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("add_block", dst.len(), &[a.len(), b.len()]);
    let n = split(dst.len());
    // SAFETY: lengths are equal and every access is below `n <= len`.
    unsafe {
        let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
        let mut i = 0;
        while i < n {
            vst1q_f64(d.add(i), vaddq_f64(vld1q_f64(pa.add(i)), vld1q_f64(pb.add(i))));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = a[i] + b[i];
    }
}

pub fn add_block_in_place(dst: &mut [f64], src: &[f64]) {
    assert_len("add_block_in_place", dst.len(), &[src.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, ps) = (dst.as_mut_ptr(), src.as_ptr());
        let mut i = 0;
        while i < n {
            vst1q_f64(d.add(i), vaddq_f64(vld1q_f64(d.add(i)), vld1q_f64(ps.add(i))));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] += src[i];
    }
}

pub fn mul_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("mul_block", dst.len(), &[a.len(), b.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
        let mut i = 0;
        while i < n {
            vst1q_f64(d.add(i), vmulq_f64(vld1q_f64(pa.add(i)), vld1q_f64(pb.add(i))));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = a[i] * b[i];
    }
}

pub fn mul_block_in_place(dst: &mut [f64], src: &[f64]) {
    assert_len("mul_block_in_place", dst.len(), &[src.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, ps) = (dst.as_mut_ptr(), src.as_ptr());
        let mut i = 0;
        while i < n {
            vst1q_f64(d.add(i), vmulq_f64(vld1q_f64(d.add(i)), vld1q_f64(ps.add(i))));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] *= src[i];
    }
}

pub fn scale_block(dst: &mut [f64], a: &[f64], scale: f64) {
    assert_len("scale_block", dst.len(), &[a.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pa) = (dst.as_mut_ptr(), a.as_ptr());
        let s = vdupq_n_f64(scale);
        let mut i = 0;
        while i < n {
            vst1q_f64(d.add(i), vmulq_f64(vld1q_f64(pa.add(i)), s));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = a[i] * scale;
    }
}

pub fn scale_block_in_place(dst: &mut [f64], scale: f64) {
    let n = split(dst.len());
    // SAFETY: every access is below `n <= dst.len()`.
    unsafe {
        let d = dst.as_mut_ptr();
        let s = vdupq_n_f64(scale);
        let mut i = 0;
        while i < n {
            vst1q_f64(d.add(i), vmulq_f64(vld1q_f64(d.add(i)), s));
            i += LANES;
        }
    }
    for v in &mut dst[n..] {
        *v *= scale;
    }
}

pub fn add_mul_block(dst: &mut [f64], a: &[f64], b: &[f64], scale: f64) {
    assert_len("add_mul_block", dst.len(), &[a.len(), b.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
        let s = vdupq_n_f64(scale);
        let mut i = 0;
        while i < n {
            let sum = vaddq_f64(vld1q_f64(pa.add(i)), vld1q_f64(pb.add(i)));
            vst1q_f64(d.add(i), vmulq_f64(sum, s));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = (a[i] + b[i]) * scale;
    }
}

/// Uses separate multiply and add (`vfmaq_f64` would round once and
/// diverge from `generic`).
pub fn mul_add_block(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64]) {
    assert_len("mul_add_block", dst.len(), &[a.len(), b.len(), c.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pa, pb, pc) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr(), c.as_ptr());
        let mut i = 0;
        while i < n {
            let prod = vmulq_f64(vld1q_f64(pa.add(i)), vld1q_f64(pb.add(i)));
            vst1q_f64(d.add(i), vaddq_f64(prod, vld1q_f64(pc.add(i))));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = a[i] * b[i] + c[i];
    }
}

pub fn max_abs(x: &[f64]) -> f64 {
    let n = split(x.len());
    // SAFETY: every access is below `n <= x.len()`.
    let mut m = unsafe {
        let p = x.as_ptr();
        let mut acc = vdupq_n_f64(0.0);
        let mut i = 0;
        while i < n {
            acc = vmaxq_f64(acc, vabsq_f64(vld1q_f64(p.add(i))));
            i += LANES;
        }
        vmaxvq_f64(acc)
    };
    for &v in &x[n..] {
        let v = v.abs();
        if v > m {
            m = v;
        }
    }
    m
}

pub fn sum(x: &[f64]) -> f64 {
    let n = split(x.len());
    // SAFETY: every access is below `n <= x.len()`.
    let mut total = unsafe {
        let p = x.as_ptr();
        let mut acc = vdupq_n_f64(0.0);
        let mut i = 0;
        while i < n {
            acc = vaddq_f64(acc, vld1q_f64(p.add(i)));
            i += LANES;
        }
        vaddvq_f64(acc)
    };
    for &v in &x[n..] {
        total += v;
    }
    total
}

pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let n = split(len);
    // SAFETY: every access is below `n <= min(a.len(), b.len())`.
    let mut total = unsafe {
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        let mut acc = vdupq_n_f64(0.0);
        let mut i = 0;
        while i < n {
            acc = vaddq_f64(acc, vmulq_f64(vld1q_f64(pa.add(i)), vld1q_f64(pb.add(i))));
            i += LANES;
        }
        vaddvq_f64(acc)
    };
    for i in n..len {
        total += a[i] * b[i];
    }
    total
}

pub fn magnitude(dst: &mut [f64], re: &[f64], im: &[f64]) {
    assert_len("magnitude", dst.len(), &[re.len(), im.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pr, pi) = (dst.as_mut_ptr(), re.as_ptr(), im.as_ptr());
        let mut i = 0;
        while i < n {
            let r = vld1q_f64(pr.add(i));
            let m = vld1q_f64(pi.add(i));
            let p = vaddq_f64(vmulq_f64(r, r), vmulq_f64(m, m));
            vst1q_f64(d.add(i), vsqrtq_f64(p));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = (re[i] * re[i] + im[i] * im[i]).sqrt();
    }
}

pub fn power(dst: &mut [f64], re: &[f64], im: &[f64]) {
    assert_len("power", dst.len(), &[re.len(), im.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pr, pi) = (dst.as_mut_ptr(), re.as_ptr(), im.as_ptr());
        let mut i = 0;
        while i < n {
            let r = vld1q_f64(pr.add(i));
            let m = vld1q_f64(pi.add(i));
            vst1q_f64(d.add(i), vaddq_f64(vmulq_f64(r, r), vmulq_f64(m, m)));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = re[i] * re[i] + im[i] * im[i];
    }
}
