//! Kernel-selection configuration with TOML and environment support.
//!
//! A `KernelConfig` narrows what the dispatch core may select: it can force
//! the generic kernels or cap the SIMD tier. It never widens what the host
//! actually supports.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DspError, Result};

/// Environment variable forcing the generic kernels (`1`, `true`, `yes`, `on`).
pub const ENV_FORCE_GENERIC: &str = "DSP_FORCE_GENERIC";
/// Environment variable capping the SIMD tier by display name (e.g. `SSE2`).
pub const ENV_MAX_SIMD: &str = "DSP_MAX_SIMD";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Kernel-selection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Disable every SIMD tier.
    pub force_generic: bool,
    /// Highest SIMD tier the dispatcher may select, by display name.
    pub max_level: Option<String>,
    /// Logging level (trace, debug, info, warn, error, off).
    pub log_level: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            force_generic: false,
            max_level: None,
            log_level: "info".into(),
        }
    }
}

impl KernelConfig {
    /// Load configuration from TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DspError::Other(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| DspError::Other(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Build a configuration from `DSP_FORCE_GENERIC` and `DSP_MAX_SIMD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_FORCE_GENERIC) {
            config.force_generic = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(DspError::InvalidConfig(format!(
                        "{} must be a boolean, got {:?}",
                        ENV_FORCE_GENERIC, other
                    )))
                }
            };
        }
        if let Some(raw) = lookup(ENV_MAX_SIMD) {
            let raw = raw.trim();
            if !raw.is_empty() {
                config.max_level = Some(raw.to_string());
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// True when the config changes nothing about host detection.
    pub fn is_passthrough(&self) -> bool {
        !self.force_generic && self.max_level.is_none()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.max_level {
            if level.trim().is_empty() {
                return Err(DspError::InvalidConfig(
                    "max_level must not be empty".into(),
                ));
            }
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(DspError::InvalidConfig(format!(
                "log_level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.log_level
            )));
        }
        Ok(())
    }
}
