//! Operation identifiers, kernel function signatures, and the Entry type
//! each kernel variant registers.

use std::fmt;

use dsp_cpu::SimdLevel;

/// `dst[i] = f(a[i], b[i])`; also `(dst, re, im)` for magnitude/power.
pub type BinaryFn = fn(&mut [f64], &[f64], &[f64]);
/// `dst[i] = f(dst[i], src[i])`.
pub type InPlaceFn = fn(&mut [f64], &[f64]);
/// `dst[i] = src[i] * scale`.
pub type ScaleFn = fn(&mut [f64], &[f64], f64);
/// `dst[i] *= scale`.
pub type ScaleInPlaceFn = fn(&mut [f64], f64);
/// `dst[i] = (a[i] + b[i]) * scale`.
pub type AddMulFn = fn(&mut [f64], &[f64], &[f64], f64);
/// `dst[i] = a[i] * b[i] + c[i]`.
pub type MulAddFn = fn(&mut [f64], &[f64], &[f64], &[f64]);
/// Single-sequence reduction.
pub type ReduceFn = fn(&[f64]) -> f64;
/// Two-sequence reduction.
pub type DotFn = fn(&[f64], &[f64]) -> f64;

/// Identifies one dispatchable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpId {
    AddBlock,
    AddBlockInPlace,
    MulBlock,
    MulBlockInPlace,
    ScaleBlock,
    ScaleBlockInPlace,
    AddMulBlock,
    MulAddBlock,
    MaxAbs,
    Sum,
    DotProduct,
    Magnitude,
    Power,
}

impl OpId {
    pub const ALL: [OpId; 13] = [
        OpId::AddBlock,
        OpId::AddBlockInPlace,
        OpId::MulBlock,
        OpId::MulBlockInPlace,
        OpId::ScaleBlock,
        OpId::ScaleBlockInPlace,
        OpId::AddMulBlock,
        OpId::MulAddBlock,
        OpId::MaxAbs,
        OpId::Sum,
        OpId::DotProduct,
        OpId::Magnitude,
        OpId::Power,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OpId::AddBlock => "add_block",
            OpId::AddBlockInPlace => "add_block_in_place",
            OpId::MulBlock => "mul_block",
            OpId::MulBlockInPlace => "mul_block_in_place",
            OpId::ScaleBlock => "scale_block",
            OpId::ScaleBlockInPlace => "scale_block_in_place",
            OpId::AddMulBlock => "add_mul_block",
            OpId::MulAddBlock => "mul_add_block",
            OpId::MaxAbs => "max_abs",
            OpId::Sum => "sum",
            OpId::DotProduct => "dot_product",
            OpId::Magnitude => "magnitude",
            OpId::Power => "power",
        }
    }

    /// Reductions may reassociate across lanes; elementwise ops may not.
    pub fn is_reduction(&self) -> bool {
        matches!(self, OpId::MaxAbs | OpId::Sum | OpId::DotProduct)
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function table of one kernel variant. A `None` slot means the variant
/// does not implement that operation.
#[derive(Clone, Copy, Default)]
pub struct Operations {
    pub add_block: Option<BinaryFn>,
    pub add_block_in_place: Option<InPlaceFn>,
    pub mul_block: Option<BinaryFn>,
    pub mul_block_in_place: Option<InPlaceFn>,
    pub scale_block: Option<ScaleFn>,
    pub scale_block_in_place: Option<ScaleInPlaceFn>,
    pub add_mul_block: Option<AddMulFn>,
    pub mul_add_block: Option<MulAddFn>,
    pub max_abs: Option<ReduceFn>,
    pub sum: Option<ReduceFn>,
    pub dot_product: Option<DotFn>,
    pub magnitude: Option<BinaryFn>,
    pub power: Option<BinaryFn>,
}

impl Operations {
    pub const EMPTY: Operations = Operations {
        add_block: None,
        add_block_in_place: None,
        mul_block: None,
        mul_block_in_place: None,
        scale_block: None,
        scale_block_in_place: None,
        add_mul_block: None,
        mul_add_block: None,
        max_abs: None,
        sum: None,
        dot_product: None,
        magnitude: None,
        power: None,
    };

    pub fn has(&self, op: OpId) -> bool {
        match op {
            OpId::AddBlock => self.add_block.is_some(),
            OpId::AddBlockInPlace => self.add_block_in_place.is_some(),
            OpId::MulBlock => self.mul_block.is_some(),
            OpId::MulBlockInPlace => self.mul_block_in_place.is_some(),
            OpId::ScaleBlock => self.scale_block.is_some(),
            OpId::ScaleBlockInPlace => self.scale_block_in_place.is_some(),
            OpId::AddMulBlock => self.add_mul_block.is_some(),
            OpId::MulAddBlock => self.mul_add_block.is_some(),
            OpId::MaxAbs => self.max_abs.is_some(),
            OpId::Sum => self.sum.is_some(),
            OpId::DotProduct => self.dot_product.is_some(),
            OpId::Magnitude => self.magnitude.is_some(),
            OpId::Power => self.power.is_some(),
        }
    }

    /// Operations this table provides, in `OpId::ALL` order.
    pub fn implemented(&self) -> impl Iterator<Item = OpId> + '_ {
        OpId::ALL.into_iter().filter(move |&op| self.has(op))
    }

    pub fn is_complete(&self) -> bool {
        OpId::ALL.iter().all(|&op| self.has(op))
    }
}

impl fmt::Debug for Operations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.implemented().map(|op| op.name()))
            .finish()
    }
}

/// One registered kernel variant.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    /// Human-readable identifier (`"avx2"`, `"neon"`, ...).
    pub name: &'static str,
    /// Tier the host must support for this variant to be selected.
    pub level: SimdLevel,
    /// Higher wins among compatible Entries. Built-ins use
    /// generic 0, SSE2 10, NEON 15, AVX2 20.
    pub priority: i32,
    pub ops: Operations,
}
