//! Capability snapshot types and the tier compatibility predicate.

use std::fmt;
use std::str::FromStr;

use dsp_core::DspError;

/// Architecture tag carried by a capability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
    Other,
}

impl Arch {
    /// Architecture this binary was compiled for.
    pub const fn host() -> Self {
        if cfg!(target_arch = "x86_64") {
            Arch::X86_64
        } else if cfg!(target_arch = "aarch64") {
            Arch::Aarch64
        } else {
            Arch::Other
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
            Arch::Other => "other",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instruction-set tier a kernel variant requires.
///
/// Tiers within one architecture are ordered by generation; the order of
/// the enum itself carries no meaning across architectures. Selection
/// between tiers is decided by Entry priority, not by this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdLevel {
    /// Portable scalar baseline. Always supported.
    None,
    Sse2,
    Avx,
    Avx2,
    Avx512,
    Neon,
    Sve,
}

impl SimdLevel {
    pub const ALL: [SimdLevel; 7] = [
        SimdLevel::None,
        SimdLevel::Sse2,
        SimdLevel::Avx,
        SimdLevel::Avx2,
        SimdLevel::Avx512,
        SimdLevel::Neon,
        SimdLevel::Sve,
    ];

    /// Display name (`"AVX-512"`, `"NEON"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            SimdLevel::None => "None",
            SimdLevel::Sse2 => "SSE2",
            SimdLevel::Avx => "AVX",
            SimdLevel::Avx2 => "AVX2",
            SimdLevel::Avx512 => "AVX-512",
            SimdLevel::Neon => "NEON",
            SimdLevel::Sve => "SVE",
        }
    }

    /// Architecture the tier belongs to; `None` for the portable baseline.
    pub fn arch(&self) -> Option<Arch> {
        match self {
            SimdLevel::None => None,
            SimdLevel::Sse2 | SimdLevel::Avx | SimdLevel::Avx2 | SimdLevel::Avx512 => {
                Some(Arch::X86_64)
            }
            SimdLevel::Neon | SimdLevel::Sve => Some(Arch::Aarch64),
        }
    }

    /// Generation index within the tier's architecture (baseline is 0).
    fn generation(&self) -> u8 {
        match self {
            SimdLevel::None => 0,
            SimdLevel::Sse2 | SimdLevel::Neon => 1,
            SimdLevel::Avx | SimdLevel::Sve => 2,
            SimdLevel::Avx2 => 3,
            SimdLevel::Avx512 => 4,
        }
    }

    /// True if `self` is the baseline, or shares `max`'s architecture and is
    /// no newer than it.
    pub fn within(&self, max: SimdLevel) -> bool {
        *self == SimdLevel::None
            || (self.arch() == max.arch() && self.generation() <= max.generation())
    }
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimdLevel {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "generic" | "scalar" => Ok(SimdLevel::None),
            "sse2" => Ok(SimdLevel::Sse2),
            "avx" => Ok(SimdLevel::Avx),
            "avx2" => Ok(SimdLevel::Avx2),
            "avx-512" | "avx512" => Ok(SimdLevel::Avx512),
            "neon" => Ok(SimdLevel::Neon),
            "sve" => Ok(SimdLevel::Sve),
            _ => Err(DspError::UnknownSimdLevel(s.to_string())),
        }
    }
}

/// Immutable snapshot of the instruction-set extensions the process should
/// behave as if it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuFeatures {
    pub has_sse2: bool,
    pub has_avx: bool,
    pub has_avx2: bool,
    pub has_fma: bool,
    pub has_avx512: bool,
    pub has_neon: bool,
    pub has_sve: bool,
    /// Disable every SIMD tier regardless of the flags above.
    pub force_generic: bool,
    pub arch: Arch,
}

impl Default for CpuFeatures {
    fn default() -> Self {
        Self {
            has_sse2: false,
            has_avx: false,
            has_avx2: false,
            has_fma: false,
            has_avx512: false,
            has_neon: false,
            has_sve: false,
            force_generic: false,
            arch: Arch::host(),
        }
    }
}

impl CpuFeatures {
    /// Baseline-only snapshot: every SIMD tier disabled.
    pub fn generic() -> Self {
        Self {
            force_generic: true,
            ..Self::default()
        }
    }

    /// Snapshot of a CPU providing exactly `level` and everything it implies
    /// on its own architecture.
    pub fn with_level(level: SimdLevel) -> Self {
        let mut f = Self {
            arch: level.arch().unwrap_or_else(Arch::host),
            ..Self::default()
        };
        for implied in SimdLevel::ALL {
            if implied != SimdLevel::None && implied.within(level) {
                f.set_flag(implied, true);
            }
        }
        f.has_fma = matches!(level, SimdLevel::Avx2 | SimdLevel::Avx512);
        f
    }

    /// Raw flag for a tier, ignoring `force_generic` and the arch tag.
    pub fn flag(&self, level: SimdLevel) -> bool {
        match level {
            SimdLevel::None => true,
            SimdLevel::Sse2 => self.has_sse2,
            SimdLevel::Avx => self.has_avx,
            SimdLevel::Avx2 => self.has_avx2,
            SimdLevel::Avx512 => self.has_avx512,
            SimdLevel::Neon => self.has_neon,
            SimdLevel::Sve => self.has_sve,
        }
    }

    fn set_flag(&mut self, level: SimdLevel, value: bool) {
        match level {
            SimdLevel::None => {}
            SimdLevel::Sse2 => self.has_sse2 = value,
            SimdLevel::Avx => self.has_avx = value,
            SimdLevel::Avx2 => self.has_avx2 = value,
            SimdLevel::Avx512 => self.has_avx512 = value,
            SimdLevel::Neon => self.has_neon = value,
            SimdLevel::Sve => self.has_sve = value,
        }
    }

    /// Tier compatibility predicate. See [`supports`].
    pub fn supports(&self, level: SimdLevel) -> bool {
        supports(self, level)
    }

    /// Copy of this snapshot with every tier newer than `max` cleared.
    /// Capping at `SimdLevel::None` forces the baseline.
    pub fn capped_at(&self, max: SimdLevel) -> Self {
        if max == SimdLevel::None {
            return Self {
                force_generic: true,
                ..*self
            };
        }
        let mut out = *self;
        for level in SimdLevel::ALL {
            if !level.within(max) {
                out.set_flag(level, false);
            }
        }
        // FMA ships with AVX2 in every tier table above.
        if !SimdLevel::Avx2.within(max) {
            out.has_fma = false;
        }
        out
    }

    /// Newest tier this snapshot supports on its architecture.
    pub fn best_level(&self) -> SimdLevel {
        const NEWEST_FIRST: [SimdLevel; 6] = [
            SimdLevel::Avx512,
            SimdLevel::Avx2,
            SimdLevel::Avx,
            SimdLevel::Sse2,
            SimdLevel::Sve,
            SimdLevel::Neon,
        ];
        NEWEST_FIRST
            .into_iter()
            .find(|&level| self.supports(level))
            .unwrap_or(SimdLevel::None)
    }
}

impl fmt::Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.arch)?;
        let mut first = true;
        for level in SimdLevel::ALL {
            if level != SimdLevel::None && self.flag(level) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(level.name())?;
                first = false;
            }
        }
        if self.has_fma {
            f.write_str(if first { "FMA" } else { " FMA" })?;
        }
        f.write_str("]")?;
        if self.force_generic {
            f.write_str(" (forced generic)")?;
        }
        Ok(())
    }
}

/// Tier compatibility predicate.
///
/// The baseline is always supported. Any other tier needs its flag set,
/// `force_generic` clear, and a matching architecture tag, so a malformed
/// override (say, NEON flagged on an x86_64 snapshot) never selects a
/// kernel for the wrong instruction set.
pub fn supports(features: &CpuFeatures, level: SimdLevel) -> bool {
    if level == SimdLevel::None {
        return true;
    }
    if features.force_generic {
        return false;
    }
    if level.arch() != Some(features.arch) {
        return false;
    }
    features.flag(level)
}
