//! Runtime-dispatched elementwise and reduction kernels over `f64`.
//!
//! Kernel variants (generic, SSE2, AVX2, NEON) register an [`Entry`] into
//! [`KERNELS`] at link time. Each public operation owns a [`Dispatcher`]
//! that picks the highest-priority Entry the host supports on first call
//! and caches its function pointer.
//!
//! ```
//! let a = [1.0, 2.0, 3.0];
//! let b = [4.0, 5.0, 6.0];
//! let mut dst = [0.0; 3];
//! vecmath::add_block(&mut dst, &a, &b);
//! assert_eq!(dst, [5.0, 7.0, 9.0]);
//! assert_eq!(vecmath::dot_product(&a, &b), 32.0);
//! ```
//!
//! Capability overrides (see [`apply_config`] and
//! [`dsp_cpu::set_forced_features`]) only affect dispatchers that have not
//! resolved yet, so they belong at program start.

pub mod dispatch;
pub mod kernels;
pub mod ops;
pub mod registry;
pub mod table;

use std::str::FromStr;

use dsp_core::{KernelConfig, Result};
use dsp_cpu::{detect_features, set_forced_features, CpuFeatures, SimdLevel};

pub use dispatch::Dispatcher;
pub use kernels::check_len;
pub use ops::{
    add_block, add_block_in_place, add_mul_block, dot_product, magnitude, max_abs, mul_add_block,
    mul_block, mul_block_in_place, power, scale_block, scale_block_in_place, selected_kernel,
    selected_kernels, sum,
};
pub use registry::{Registry, KERNELS};
pub use table::{Entry, OpId, Operations};

/// Snapshot a config turns `detected` into, or `None` when the config
/// changes nothing.
pub fn features_for_config(
    config: &KernelConfig,
    detected: CpuFeatures,
) -> Result<Option<CpuFeatures>> {
    config.validate()?;
    if config.is_passthrough() {
        return Ok(None);
    }
    let mut features = detected;
    if let Some(max) = config.max_level.as_deref() {
        features = features.capped_at(SimdLevel::from_str(max)?);
    }
    if config.force_generic {
        features.force_generic = true;
    }
    Ok(Some(features))
}

/// Install the capability override described by `config` and return the
/// snapshot dispatch will see. A passthrough config installs nothing.
pub fn apply_config(config: &KernelConfig) -> Result<CpuFeatures> {
    let detected = detect_features();
    match features_for_config(config, detected)? {
        Some(features) => {
            set_forced_features(features);
            Ok(features)
        }
        None => Ok(detected),
    }
}
