//! CPU capability model and detection for DSP kernel selection.
//!
//! A [`CpuFeatures`] snapshot says which instruction-set extensions the
//! process should behave as if it has: either the real host probe or a
//! forced override for deterministic tests. [`supports`] decides whether a
//! kernel tier ([`SimdLevel`]) may run under a snapshot.
//!
//! ```text
//! Tier      Arch      Flag          Typical hardware
//! ────────  ────────  ────────────  ─────────────────────────────
//! None      any       (always)      portable scalar fallback
//! SSE2      x86_64    has_sse2      every x86_64 CPU
//! AVX       x86_64    has_avx       Sandy Bridge (2011+)
//! AVX2      x86_64    has_avx2      Haswell (2013+), Excavator (2015+)
//! AVX-512   x86_64    has_avx512    Skylake-SP, Zen4 (F + BW)
//! NEON      aarch64   has_neon      every ARMv8 CPU
//! SVE       aarch64   has_sve       Neoverse V1, Graviton3
//! ```

pub mod detect;
pub mod features;

pub use detect::{
    detect_features, force_features, forced_features, has_avx2, has_avx512, has_neon, has_sse2,
    reset_detection, set_forced_features, ForcedFeaturesGuard,
};
pub use features::{supports, Arch, CpuFeatures, SimdLevel};
