//! Runtime CPU feature detection and the process-wide test override.
//!
//! `detect_features()` probes the host through `std::arch` on every call
//! (the standard library caches the underlying CPUID / auxv reads), unless
//! an override is installed. The override lifecycle is explicit:
//!
//! ```text
//! unset ──set_forced_features──▶ forced ──reset_detection──▶ unset
//! ```
//!
//! Prefer [`force_features`], which returns a guard that resets on drop.
//! Dispatchers that already resolved keep their cached kernel; an override
//! only affects resolutions that happen while it is installed.

use std::sync::{PoisonError, RwLock};

use crate::features::{Arch, CpuFeatures, SimdLevel};

static FORCED: RwLock<Option<CpuFeatures>> = RwLock::new(None);

/// Capabilities the current process should behave as if it has.
///
/// Returns the forced snapshot verbatim while an override is installed,
/// otherwise the real host probe.
pub fn detect_features() -> CpuFeatures {
    if let Some(forced) = forced_features() {
        return forced;
    }
    let features = probe_host();
    tracing::debug!(%features, "detected host CPU features");
    features
}

/// Override detection with `features` until [`reset_detection`].
pub fn set_forced_features(features: CpuFeatures) {
    tracing::warn!(%features, "CPU feature detection overridden");
    *FORCED.write().unwrap_or_else(PoisonError::into_inner) = Some(features);
}

/// Drop any override installed by [`set_forced_features`].
pub fn reset_detection() {
    let previous = FORCED
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if previous.is_some() {
        tracing::debug!("CPU feature override cleared");
    }
}

/// Currently installed override, if any.
pub fn forced_features() -> Option<CpuFeatures> {
    *FORCED.read().unwrap_or_else(PoisonError::into_inner)
}

/// Guard returned by [`force_features`]; clears the override when dropped.
#[must_use = "the override is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ForcedFeaturesGuard {
    _private: (),
}

impl Drop for ForcedFeaturesGuard {
    fn drop(&mut self) {
        reset_detection();
    }
}

/// Install an override for the lifetime of the returned guard.
pub fn force_features(features: CpuFeatures) -> ForcedFeaturesGuard {
    set_forced_features(features);
    ForcedFeaturesGuard { _private: () }
}

/// Check if SSE2 is usable (baseline on every x86_64 CPU).
pub fn has_sse2() -> bool {
    detect_features().supports(SimdLevel::Sse2)
}

/// Check if AVX2 is usable.
pub fn has_avx2() -> bool {
    detect_features().supports(SimdLevel::Avx2)
}

/// Check if AVX-512 (F + BW) is usable.
pub fn has_avx512() -> bool {
    detect_features().supports(SimdLevel::Avx512)
}

/// Check if NEON is usable (always true on AArch64).
pub fn has_neon() -> bool {
    detect_features().supports(SimdLevel::Neon)
}

#[cfg(target_arch = "x86_64")]
fn probe_host() -> CpuFeatures {
    use std::arch::is_x86_feature_detected;
    CpuFeatures {
        has_sse2: is_x86_feature_detected!("sse2"),
        has_avx: is_x86_feature_detected!("avx"),
        has_avx2: is_x86_feature_detected!("avx2"),
        has_fma: is_x86_feature_detected!("fma"),
        has_avx512: is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw"),
        arch: Arch::X86_64,
        ..CpuFeatures::default()
    }
}

#[cfg(target_arch = "aarch64")]
fn probe_host() -> CpuFeatures {
    use std::arch::is_aarch64_feature_detected;
    CpuFeatures {
        has_neon: is_aarch64_feature_detected!("neon"),
        has_sve: is_aarch64_feature_detected!("sve"),
        arch: Arch::Aarch64,
        ..CpuFeatures::default()
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn probe_host() -> CpuFeatures {
    CpuFeatures {
        arch: Arch::Other,
        ..CpuFeatures::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The override is process-global; tests touching it run one at a time.
    static OVERRIDE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_probe_matches_host_arch() {
        assert_eq!(probe_host().arch, Arch::host());
        assert!(!probe_host().force_generic);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_x86_64_always_has_sse2() {
        assert!(probe_host().has_sse2);
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn test_aarch64_always_has_neon() {
        assert!(probe_host().has_neon);
    }

    #[test]
    fn test_forced_features_returned_verbatim() {
        let _lock = OVERRIDE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let forced = CpuFeatures {
            has_sve: true,
            arch: Arch::Other,
            ..CpuFeatures::generic()
        };
        set_forced_features(forced);
        assert_eq!(detect_features(), forced);
        assert_eq!(forced_features(), Some(forced));
        reset_detection();
        assert_eq!(forced_features(), None);
        assert_eq!(detect_features(), probe_host());
    }

    #[test]
    fn test_guard_resets_on_drop() {
        let _lock = OVERRIDE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let _guard = force_features(CpuFeatures::generic());
            assert!(detect_features().force_generic);
            assert!(!has_avx2());
            assert!(!has_neon());
        }
        assert_eq!(forced_features(), None);
    }

    #[test]
    fn test_reset_without_override_is_noop() {
        let _lock = OVERRIDE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        reset_detection();
        reset_detection();
        assert_eq!(forced_features(), None);
    }
}
