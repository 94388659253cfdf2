//! SSE2 kernels: 2 × f64 per register.
//!
//! SSE2 is part of the x86_64 baseline, so these run without a runtime
//! guard. Each function handles `len - len % LANES` elements in vector
//! registers and the remainder with the scalar formula from `generic`.

use std::arch::x86_64::*;

use dsp_cpu::SimdLevel;
use linkme::distributed_slice;

use super::assert_len;
use crate::registry::KERNELS;
use crate::table::{Entry, Operations};

pub const NAME: &str = "sse2";
pub const PRIORITY: i32 = 10;
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
    level: SimdLevel::Sse2,
    priority: PRIORITY,
    ops: OPS,
};

#[distributed_slice(KERNELS)]
static SSE2_ENTRY: Entry = ENTRY;

#[inline]
fn split(len: usize) -> usize {
    len - len % LANES
}

#[inline]
unsafe fn hsum(v: __m128d) -> f64 {
    let hi = _mm_unpackhi_pd(v, v);
    _mm_cvtsd_f64(_mm_add_sd(v, hi))
}

pub fn add_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("add_block", dst.len(), &[a.len(), b.len()]);
    let n = split(dst.len());
    // SAFETY: lengths are equal and every access is below `n <= len`.
    unsafe {
        let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
        let mut i = 0;
        while i < n {
            let v = _mm_add_pd(_mm_loadu_pd(pa.add(i)), _mm_loadu_pd(pb.add(i)));
            _mm_storeu_pd(d.add(i), v);
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
            let v = _mm_add_pd(_mm_loadu_pd(d.add(i)), _mm_loadu_pd(ps.add(i)));
            _mm_storeu_pd(d.add(i), v);
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
            let v = _mm_mul_pd(_mm_loadu_pd(pa.add(i)), _mm_loadu_pd(pb.add(i)));
            _mm_storeu_pd(d.add(i), v);
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
            let v = _mm_mul_pd(_mm_loadu_pd(d.add(i)), _mm_loadu_pd(ps.add(i)));
            _mm_storeu_pd(d.add(i), v);
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
        let s = _mm_set1_pd(scale);
        let mut i = 0;
        while i < n {
            _mm_storeu_pd(d.add(i), _mm_mul_pd(_mm_loadu_pd(pa.add(i)), s));
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
        let s = _mm_set1_pd(scale);
        let mut i = 0;
        while i < n {
            _mm_storeu_pd(d.add(i), _mm_mul_pd(_mm_loadu_pd(d.add(i)), s));
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
        let s = _mm_set1_pd(scale);
        let mut i = 0;
        while i < n {
            let sum = _mm_add_pd(_mm_loadu_pd(pa.add(i)), _mm_loadu_pd(pb.add(i)));
            _mm_storeu_pd(d.add(i), _mm_mul_pd(sum, s));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = (a[i] + b[i]) * scale;
    }
}

pub fn mul_add_block(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64]) {
    assert_len("mul_add_block", dst.len(), &[a.len(), b.len(), c.len()]);
    let n = split(dst.len());
    // SAFETY: see `add_block`.
    unsafe {
        let (d, pa, pb, pc) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr(), c.as_ptr());
        let mut i = 0;
        while i < n {
            let prod = _mm_mul_pd(_mm_loadu_pd(pa.add(i)), _mm_loadu_pd(pb.add(i)));
            _mm_storeu_pd(d.add(i), _mm_add_pd(prod, _mm_loadu_pd(pc.add(i))));
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
        let sign = _mm_set1_pd(-0.0);
        let mut acc = _mm_setzero_pd();
        let mut i = 0;
        while i < n {
            acc = _mm_max_pd(acc, _mm_andnot_pd(sign, _mm_loadu_pd(p.add(i))));
            i += LANES;
        }
        let hi = _mm_unpackhi_pd(acc, acc);
        _mm_cvtsd_f64(_mm_max_sd(acc, hi))
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
        let mut acc = _mm_setzero_pd();
        let mut i = 0;
        while i < n {
            acc = _mm_add_pd(acc, _mm_loadu_pd(p.add(i)));
            i += LANES;
        }
        hsum(acc)
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
        let mut acc = _mm_setzero_pd();
        let mut i = 0;
        while i < n {
            let prod = _mm_mul_pd(_mm_loadu_pd(pa.add(i)), _mm_loadu_pd(pb.add(i)));
            acc = _mm_add_pd(acc, prod);
            i += LANES;
        }
        hsum(acc)
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
            let r = _mm_loadu_pd(pr.add(i));
            let m = _mm_loadu_pd(pi.add(i));
            let p = _mm_add_pd(_mm_mul_pd(r, r), _mm_mul_pd(m, m));
            _mm_storeu_pd(d.add(i), _mm_sqrt_pd(p));
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
            let r = _mm_loadu_pd(pr.add(i));
            let m = _mm_loadu_pd(pi.add(i));
            _mm_storeu_pd(d.add(i), _mm_add_pd(_mm_mul_pd(r, r), _mm_mul_pd(m, m)));
            i += LANES;
        }
    }
    for i in n..dst.len() {
        dst[i] = re[i] * re[i] + im[i] * im[i];
    }
}
