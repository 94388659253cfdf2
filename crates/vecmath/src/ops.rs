//! Public operation functions.
//!
//! Each function forwards to its own [`Dispatcher`]; resolving one
//! operation never resolves another. Elementwise operations panic on a
//! length mismatch before writing to `dst`.

use dsp_core::Result;

use crate::dispatch::Dispatcher;
use crate::table::{
    AddMulFn, BinaryFn, DotFn, InPlaceFn, MulAddFn, OpId, ReduceFn, ScaleFn, ScaleInPlaceFn,
};

static ADD_BLOCK: Dispatcher<BinaryFn> = Dispatcher::new(OpId::AddBlock, |ops| ops.add_block);
static ADD_BLOCK_IN_PLACE: Dispatcher<InPlaceFn> =
    Dispatcher::new(OpId::AddBlockInPlace, |ops| ops.add_block_in_place);
static MUL_BLOCK: Dispatcher<BinaryFn> = Dispatcher::new(OpId::MulBlock, |ops| ops.mul_block);
static MUL_BLOCK_IN_PLACE: Dispatcher<InPlaceFn> =
    Dispatcher::new(OpId::MulBlockInPlace, |ops| ops.mul_block_in_place);
static SCALE_BLOCK: Dispatcher<ScaleFn> =
    Dispatcher::new(OpId::ScaleBlock, |ops| ops.scale_block);
static SCALE_BLOCK_IN_PLACE: Dispatcher<ScaleInPlaceFn> =
    Dispatcher::new(OpId::ScaleBlockInPlace, |ops| ops.scale_block_in_place);
static ADD_MUL_BLOCK: Dispatcher<AddMulFn> =
    Dispatcher::new(OpId::AddMulBlock, |ops| ops.add_mul_block);
static MUL_ADD_BLOCK: Dispatcher<MulAddFn> =
    Dispatcher::new(OpId::MulAddBlock, |ops| ops.mul_add_block);
static MAX_ABS: Dispatcher<ReduceFn> = Dispatcher::new(OpId::MaxAbs, |ops| ops.max_abs);
static SUM: Dispatcher<ReduceFn> = Dispatcher::new(OpId::Sum, |ops| ops.sum);
static DOT_PRODUCT: Dispatcher<DotFn> =
    Dispatcher::new(OpId::DotProduct, |ops| ops.dot_product);
static MAGNITUDE: Dispatcher<BinaryFn> = Dispatcher::new(OpId::Magnitude, |ops| ops.magnitude);
static POWER: Dispatcher<BinaryFn> = Dispatcher::new(OpId::Power, |ops| ops.power);

/// `dst[i] = a[i] + b[i]`
#[inline]
pub fn add_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    (ADD_BLOCK.get())(dst, a, b)
}

/// `dst[i] += src[i]`
#[inline]
pub fn add_block_in_place(dst: &mut [f64], src: &[f64]) {
    (ADD_BLOCK_IN_PLACE.get())(dst, src)
}

/// `dst[i] = a[i] * b[i]`
#[inline]
pub fn mul_block(dst: &mut [f64], a: &[f64], b: &[f64]) {
    (MUL_BLOCK.get())(dst, a, b)
}

/// `dst[i] *= src[i]`
#[inline]
pub fn mul_block_in_place(dst: &mut [f64], src: &[f64]) {
    (MUL_BLOCK_IN_PLACE.get())(dst, src)
}

/// `dst[i] = a[i] * scale`
#[inline]
pub fn scale_block(dst: &mut [f64], a: &[f64], scale: f64) {
    (SCALE_BLOCK.get())(dst, a, scale)
}

/// `dst[i] *= scale`
#[inline]
pub fn scale_block_in_place(dst: &mut [f64], scale: f64) {
    (SCALE_BLOCK_IN_PLACE.get())(dst, scale)
}

/// `dst[i] = (a[i] + b[i]) * scale`
#[inline]
pub fn add_mul_block(dst: &mut [f64], a: &[f64], b: &[f64], scale: f64) {
    (ADD_MUL_BLOCK.get())(dst, a, b, scale)
}

/// `dst[i] = a[i] * b[i] + c[i]`
#[inline]
pub fn mul_add_block(dst: &mut [f64], a: &[f64], b: &[f64], c: &[f64]) {
    (MUL_ADD_BLOCK.get())(dst, a, b, c)
}

/// Largest absolute value; 0 for an empty slice.
#[inline]
pub fn max_abs(x: &[f64]) -> f64 {
    (MAX_ABS.get())(x)
}

/// Sum of all elements; 0 for an empty slice. Vector tiers reassociate.
#[inline]
pub fn sum(x: &[f64]) -> f64 {
    (SUM.get())(x)
}

/// Dot product over the first `min(a.len(), b.len())` elements.
#[inline]
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    (DOT_PRODUCT.get())(a, b)
}

/// `dst[i] = sqrt(re[i]² + im[i]²)`, bit-identical to `sqrt` of [`power`].
#[inline]
pub fn magnitude(dst: &mut [f64], re: &[f64], im: &[f64]) {
    (MAGNITUDE.get())(dst, re, im)
}

/// `dst[i] = re[i]² + im[i]²`
#[inline]
pub fn power(dst: &mut [f64], re: &[f64], im: &[f64]) {
    (POWER.get())(dst, re, im)
}

/// Entry name the global dispatcher for `op` uses, resolving it first if
/// needed.
pub fn selected_kernel(op: OpId) -> Result<&'static str> {
    match op {
        OpId::AddBlock => ADD_BLOCK.try_init(),
        OpId::AddBlockInPlace => ADD_BLOCK_IN_PLACE.try_init(),
        OpId::MulBlock => MUL_BLOCK.try_init(),
        OpId::MulBlockInPlace => MUL_BLOCK_IN_PLACE.try_init(),
        OpId::ScaleBlock => SCALE_BLOCK.try_init(),
        OpId::ScaleBlockInPlace => SCALE_BLOCK_IN_PLACE.try_init(),
        OpId::AddMulBlock => ADD_MUL_BLOCK.try_init(),
        OpId::MulAddBlock => MUL_ADD_BLOCK.try_init(),
        OpId::MaxAbs => MAX_ABS.try_init(),
        OpId::Sum => SUM.try_init(),
        OpId::DotProduct => DOT_PRODUCT.try_init(),
        OpId::Magnitude => MAGNITUDE.try_init(),
        OpId::Power => POWER.try_init(),
    }
}

/// [`selected_kernel`] for every operation, in `OpId::ALL` order.
pub fn selected_kernels() -> Result<Vec<(OpId, &'static str)>> {
    OpId::ALL
        .into_iter()
        .map(|op| selected_kernel(op).map(|name| (op, name)))
        .collect()
}
