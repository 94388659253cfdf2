//! Kernel variants.
//!
//! Every variant exposes the same 13 functions with the same signatures and
//! contributes one [`Entry`](crate::table::Entry) to
//! [`KERNELS`](crate::registry::KERNELS). Elementwise kernels validate
//! operand lengths with [`assert_len`] before writing to `dst`; vector
//! variants process full lanes and finish with a scalar tail using the same
//! formula as [`generic`].

use dsp_core::{DspError, Result};

pub mod generic;

#[cfg(all(target_arch = "x86_64", not(feature = "generic-only")))]
pub mod avx2;
#[cfg(all(target_arch = "x86_64", not(feature = "generic-only")))]
pub mod sse2;

#[cfg(all(target_arch = "aarch64", not(feature = "generic-only")))]
pub mod neon;

/// Check that every operand length equals `dst_len`.
pub fn check_len(op: &'static str, dst_len: usize, operands: &[usize]) -> Result<()> {
    match operands.iter().find(|&&len| len != dst_len) {
        Some(&actual) => Err(DspError::LengthMismatch {
            op,
            expected: dst_len,
            actual,
        }),
        None => Ok(()),
    }
}

/// [`check_len`], panicking at the caller on mismatch.
#[track_caller]
#[inline]
pub fn assert_len(op: &'static str, dst_len: usize, operands: &[usize]) {
    if let Err(e) = check_len(op, dst_len, operands) {
        panic!("vecmath: {e}");
    }
}
