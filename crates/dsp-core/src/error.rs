//! Centralized error types for the DSP kernel crates.
//!
//! Uses thiserror for ergonomic error handling with context.

use thiserror::Error;

/// Main error type for kernel registration, dispatch and configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DspError {
    /// Operand length differs from the destination length.
    #[error("{op}: slice length mismatch (dst={expected}, operand={actual})")]
    LengthMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No registered Entry is compatible with the capability snapshot.
    #[error("no {op} implementation registered (missing generic fallback?)")]
    NoImplementation { op: &'static str },

    /// The selected Entry does not provide the requested operation.
    #[error("selected implementation {entry:?} missing {op} operation")]
    MissingOperation { entry: &'static str, op: &'static str },

    /// Unknown SIMD level name.
    #[error("unknown SIMD level: {0:?}")]
    UnknownSimdLevel(String),

    /// Invalid configuration detected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, DspError>;

impl DspError {
    /// Caller-contract violation: the call site passed malformed operands.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, DspError::LengthMismatch { .. })
    }

    /// Build or registration defect: no Entry, or an incomplete one.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DspError::NoImplementation { .. } | DspError::MissingOperation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = DspError::LengthMismatch {
            op: "add_block",
            expected: 8,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "add_block: slice length mismatch (dst=8, operand=7)"
        );
        assert!(err.is_contract_violation());
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_missing_operation_display() {
        let err = DspError::MissingOperation {
            entry: "sse2",
            op: "power",
        };
        assert!(err.to_string().contains("\"sse2\""));
        assert!(err.to_string().contains("power"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_no_implementation() {
        let err = DspError::NoImplementation { op: "sum" };
        assert!(err.to_string().contains("missing generic fallback"));
        assert!(err.is_configuration_error());
    }
}
