//! Error types for method settings.
//!
//! Settings are validated before a method starts; a violation is reported as
//! a [`ConfigError`] and converts into
//! [`ReliabilityError::InvalidArgument`] at the method boundary.

use reliability_core::types::ReliabilityError;
use thiserror::Error;

/// Configuration error for reliability method settings.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Sample counts outside their valid range.
    #[error("Invalid sample counts: minimum {minimum}, maximum {maximum}")]
    InvalidSampleCount {
        /// Configured minimum number of samples
        minimum: usize,
        /// Configured maximum number of samples
        maximum: usize,
    },

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

impl ConfigError {
    pub(crate) fn parameter(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }
}

impl From<ConfigError> for ReliabilityError {
    fn from(err: ConfigError) -> Self {
        ReliabilityError::InvalidArgument(err.to_string())
    }
}

/// Checks that a value is strictly positive and finite.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::parameter(
            name,
            format!("must be positive, got {}", value),
        ))
    }
}

/// Checks a sample count pair.
pub(crate) fn require_sample_counts(minimum: usize, maximum: usize) -> Result<(), ConfigError> {
    if maximum == 0 || minimum > maximum {
        return Err(ConfigError::InvalidSampleCount { minimum, maximum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidSampleCount {
            minimum: 10,
            maximum: 5,
        };
        assert!(err.to_string().contains("minimum 10, maximum 5"));

        let err = ConfigError::parameter("chunk_size", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'chunk_size': must be positive"
        );
    }

    #[test]
    fn test_conversion_to_reliability_error() {
        let err: ReliabilityError = ConfigError::parameter("seed", "bad").into();
        assert!(matches!(err, ReliabilityError::InvalidArgument(_)));
    }

    #[test]
    fn test_validators() {
        assert!(require_positive("x", 1.0).is_ok());
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", f64::NAN).is_err());
        assert!(require_sample_counts(1, 1).is_ok());
        assert!(require_sample_counts(2, 1).is_err());
        assert!(require_sample_counts(0, 0).is_err());
    }
}
