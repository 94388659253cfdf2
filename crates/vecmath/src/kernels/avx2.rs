//! AVX2 kernels: 4 × f64 per register.
//!
//! The vector bodies are `#[target_feature(enable = "avx2")]` functions that
//! process `len - len % LANES` elements; the safe wrappers validate lengths,
//! run the body and finish the tail with the scalar formula. The wrappers
//! re-check AVX2 at run time (a cached atomic load in std) and run the
//! generic kernel when it is absent, so a forced AVX2 snapshot on older
//! hardware stays sound. Multiply and add are kept separate (no FMA) so the
//! elementwise results match `generic` exactly.

use std::arch::x86_64::*;

use dsp_cpu::SimdLevel;
use linkme::distributed_slice;

use super::{assert_len, generic};
use crate::registry::KERNELS;
use crate::table::{Entry, Operations};

pub const NAME: &str = "avx2";
pub const PRIORITY: i32 = 20;
pub const LANES: usize = 4;

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
    level: SimdLevel::Avx2,
    priority: PRIORITY,
    ops: OPS,
};

#[distributed_slice(KERNELS)]
static AVX2_ENTRY: Entry = ENTRY;

#[inline]
fn available() -> bool {
    is_x86_feature_detected!("avx2")
}

#[inline]
fn split(len: usize) -> usize {
    len - len % LANES
}

pub fn add_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("add_block", dst.len(), &[a.len(), b.len()]);
    if !available() {
        return generic::add_block(dst, a, b);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { add_block_body(dst, a, b, n) };
    for i in n..dst.len() {
        dst[i] = a[i] + b[i];
    }
}

pub fn add_block_in_place(dst: &mut [f64], src: &[f64]) {
    assert_len("add_block_in_place", dst.len(), &[src.len()]);
    if !available() {
        return generic::add_block_in_place(dst, src);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { add_in_place_body(dst, src, n) };
    for i in n..dst.len() {
        dst[i] += src[i];
    }
}

pub fn mul_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    assert_len("mul_block", dst.len(), &[a.len(), b.len()]);
    if !available() {
        return generic::mul_block(dst, a, b);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { mul_block_body(dst, a, b, n) };
    for i in n..dst.len() {
        dst[i] = a[i] * b[i];
    }
}

pub fn mul_block_in_place(dst: &mut [f64], src: &[f64]) {
    assert_len("mul_block_in_place", dst.len(), &[src.len()]);
    if !available() {
        return generic::mul_block_in_place(dst, src);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { mul_in_place_body(dst, src, n) };
    for i in n..dst.len() {
        dst[i] *= src[i];
    }
}

pub fn scale_block(dst: &mut [f64], a: &[f64], scale: f64) {
    assert_len("scale_block", dst.len(), &[a.len()]);
    if !available() {
        return generic::scale_block(dst, a, scale);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { scale_body(dst.as_mut_ptr(), a.as_ptr(), scale, n) };
    for i in n..dst.len() {
        dst[i] = a[i] * scale;
    }
}

pub fn scale_block_in_place(dst: &mut [f64], scale: f64) {
    if !available() {
        return generic::scale_block_in_place(dst, scale);
    }
    let n = split(dst.len());
    let p = dst.as_mut_ptr();
    // SAFETY: AVX2 checked above; source and destination are the same
    // buffer and each lane is loaded before it is stored.
    unsafe { scale_body(p, p, scale, n) };
    for v in &mut dst[n..] {
        *v *= scale;
    }
}

pub fn add_mul_block(dst: &mut [f64], a: &[f64], b: &[f64], scale: f64) {
    assert_len("add_mul_block", dst.len(), &[a.len(), b.len()]);
    if !available() {
        return generic::add_mul_block(dst, a, b, scale);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { add_mul_body(dst, a, b, scale, n) };
    for i in n..dst.len() {
        dst[i] = (a[i] + b[i]) * scale;
    }
}

pub fn mul_add_block(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64]) {
    assert_len("mul_add_block", dst.len(), &[a.len(), b.len(), c.len()]);
    if !available() {
        return generic::mul_add_block(dst, a, b, c);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { mul_add_body(dst, a, b, c, n) };
    for i in n..dst.len() {
        dst[i] = a[i] * b[i] + c[i];
    }
}

pub fn max_abs(x: &[f64]) -> f64 {
    if !available() {
        return generic::max_abs(x);
    }
    let n = split(x.len());
    // SAFETY: AVX2 checked above; `n <= x.len()`.
    let mut m = unsafe { max_abs_body(x, n) };
    for &v in &x[n..] {
        let v = v.abs();
        if v > m {
            m = v;
        }
    }
    m
}

pub fn sum(x: &[f64]) -> f64 {
    if !available() {
        return generic::sum(x);
    }
    let n = split(x.len());
    // SAFETY: AVX2 checked above; `n <= x.len()`.
    let mut total = unsafe { sum_body(x, n) };
    for &v in &x[n..] {
        total += v;
    }
    total
}

pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    if !available() {
        return generic::dot_product(a, b);
    }
    let len = a.len().min(b.len());
    let n = split(len);
    // SAFETY: AVX2 checked above; `n <= min(a.len(), b.len())`.
    let mut total = unsafe { dot_body(a, b, n) };
    for i in n..len {
        total += a[i] * b[i];
    }
    total
}

pub fn magnitude(dst: &mut [f64], re: &[f64], im: &[f64]) {
    assert_len("magnitude", dst.len(), &[re.len(), im.len()]);
    if !available() {
        return generic::magnitude(dst, re, im);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { parts_body::<true>(dst, re, im, n) };
    for i in n..dst.len() {
        dst[i] = (re[i] * re[i] + im[i] * im[i]).sqrt();
    }
}

pub fn power(dst: &mut [f64], re: &[f64], im: &[f64]) {
    assert_len("power", dst.len(), &[re.len(), im.len()]);
    if !available() {
        return generic::power(dst, re, im);
    }
    let n = split(dst.len());
    // SAFETY: AVX2 checked above; lengths validated.
    unsafe { parts_body::<false>(dst, re, im, n) };
    for i in n..dst.len() {
        dst[i] = re[i] * re[i] + im[i] * im[i];
    }
}

// Vector bodies. Callers guarantee AVX2 is present, `n` is a multiple of
// LANES and every operand holds at least `n` elements.

#[target_feature(enable = "avx2")]
unsafe fn add_block_body(dst: &mut [f64], a: &[f64], b: &[f64], n: usize) {
    let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
    let mut i = 0;
    while i < n {
        let v = _mm256_add_pd(_mm256_loadu_pd(pa.add(i)), _mm256_loadu_pd(pb.add(i)));
        _mm256_storeu_pd(d.add(i), v);
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn add_in_place_body(dst: &mut [f64], src: &[f64], n: usize) {
    let (d, ps) = (dst.as_mut_ptr(), src.as_ptr());
    let mut i = 0;
    while i < n {
        let v = _mm256_add_pd(_mm256_loadu_pd(d.add(i)), _mm256_loadu_pd(ps.add(i)));
        _mm256_storeu_pd(d.add(i), v);
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn mul_block_body(dst: &mut [f64], a: &[f64], b: &[f64], n: usize) {
    let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
    let mut i = 0;
    while i < n {
        let v = _mm256_mul_pd(_mm256_loadu_pd(pa.add(i)), _mm256_loadu_pd(pb.add(i)));
        _mm256_storeu_pd(d.add(i), v);
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn mul_in_place_body(dst: &mut [f64], src: &[f64], n: usize) {
    let (d, ps) = (dst.as_mut_ptr(), src.as_ptr());
    let mut i = 0;
    while i < n {
        let v = _mm256_mul_pd(_mm256_loadu_pd(d.add(i)), _mm256_loadu_pd(ps.add(i)));
        _mm256_storeu_pd(d.add(i), v);
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn scale_body(d: *mut f64, src: *const f64, scale: f64, n: usize) {
    let s = _mm256_set1_pd(scale);
    let mut i = 0;
    while i < n {
        _mm256_storeu_pd(d.add(i), _mm256_mul_pd(_mm256_loadu_pd(src.add(i)), s));
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn add_mul_body(dst: &mut [f64], a: &[f64], b: &[f64], scale: f64, n: usize) {
    let (d, pa, pb) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr());
    let s = _mm256_set1_pd(scale);
    let mut i = 0;
    while i < n {
        let sum = _mm256_add_pd(_mm256_loadu_pd(pa.add(i)), _mm256_loadu_pd(pb.add(i)));
        _mm256_storeu_pd(d.add(i), _mm256_mul_pd(sum, s));
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn mul_add_body(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64], n: usize) {
    let (d, pa, pb, pc) = (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr(), c.as_ptr());
    let mut i = 0;
    while i < n {
        let prod = _mm256_mul_pd(_mm256_loadu_pd(pa.add(i)), _mm256_loadu_pd(pb.add(i)));
        _mm256_storeu_pd(d.add(i), _mm256_add_pd(prod, _mm256_loadu_pd(pc.add(i))));
        i += LANES;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn hsum(v: __m256d) -> f64 {
    let pair = _mm_add_pd(_mm256_castpd256_pd128(v), _mm256_extractf128_pd::<1>(v));
    let hi = _mm_unpackhi_pd(pair, pair);
    _mm_cvtsd_f64(_mm_add_sd(pair, hi))
}

#[target_feature(enable = "avx2")]
unsafe fn max_abs_body(x: &[f64], n: usize) -> f64 {
    let p = x.as_ptr();
    let sign = _mm256_set1_pd(-0.0);
    let mut acc = _mm256_setzero_pd();
    let mut i = 0;
    while i < n {
        acc = _mm256_max_pd(acc, _mm256_andnot_pd(sign, _mm256_loadu_pd(p.add(i))));
        i += LANES;
    }
    let pair = _mm_max_pd(_mm256_castpd256_pd128(acc), _mm256_extractf128_pd::<1>(acc));
    let hi = _mm_unpackhi_pd(pair, pair);
    _mm_cvtsd_f64(_mm_max_sd(pair, hi))
}

#[target_feature(enable = "avx2")]
unsafe fn sum_body(x: &[f64], n: usize) -> f64 {
    let p = x.as_ptr();
    let mut acc = _mm256_setzero_pd();
    let mut i = 0;
    while i < n {
        acc = _mm256_add_pd(acc, _mm256_loadu_pd(p.add(i)));
        i += LANES;
    }
    hsum(acc)
}

#[target_feature(enable = "avx2")]
unsafe fn dot_body(a: &[f64], b: &[f64], n: usize) -> f64 {
    let (pa, pb) = (a.as_ptr(), b.as_ptr());
    let mut acc = _mm256_setzero_pd();
    let mut i = 0;
    while i < n {
        let prod = _mm256_mul_pd(_mm256_loadu_pd(pa.add(i)), _mm256_loadu_pd(pb.add(i)));
        acc = _mm256_add_pd(acc, prod);
        i += LANES;
    }
    hsum(acc)
}

#[target_feature(enable = "avx2")]
unsafe fn parts_body<const SQRT: bool>(dst: &mut [f64], re: &[f64], im: &[f64], n: usize) {
    let (d, pr, pi) = (dst.as_mut_ptr(), re.as_ptr(), im.as_ptr());
    let mut i = 0;
    while i < n {
        let r = _mm256_loadu_pd(pr.add(i));
        let m = _mm256_loadu_pd(pi.add(i));
        let p = _mm256_add_pd(_mm256_mul_pd(r, r), _mm256_mul_pd(m, m));
        let out = if SQRT { _mm256_sqrt_pd(p) } else { p };
        _mm256_storeu_pd(d.add(i), out);
        i += LANES;
    }
}
