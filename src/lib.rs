//! Hardware-adaptive numeric kernels for digital signal processing.
//!
//! Facade over the workspace crates:
//! - [`dsp_core`]: error type and kernel-selection config
//! - [`dsp_cpu`]: capability snapshot, detection and test overrides
//! - [`vecmath`]: registry, dispatchers, operations and kernel variants

pub use dsp_core;
pub use dsp_cpu;
pub use vecmath;

pub use dsp_core::{DspError, KernelConfig, Result};
pub use dsp_cpu::{detect_features, CpuFeatures, SimdLevel};
pub use vecmath::{
    add_block, add_block_in_place, add_mul_block, dot_product, magnitude, max_abs, mul_add_block,
    mul_block, mul_block_in_place, power, scale_block, scale_block_in_place, sum,
};
