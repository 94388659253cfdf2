//! Core types shared across the DSP kernel crates.
//!
//! Provides:
//! - Centralized error types via thiserror
//! - Kernel-selection configuration with TOML and environment support

pub mod config;
pub mod error;

pub use config::KernelConfig;
pub use error::{DspError, Result};
