//! Configuration validation
//!
//! Common validation helpers shared by the socket and TLS configurations.

use std::time::Duration;

use crate::error::{self, Error};

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration conflict: {0}")]
    Conflict(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails:
    /// - `InvalidTimeout` - if a configured timeout is zero or exceeds limits
    /// - `InvalidParameter` - if parameters are outside valid ranges
    /// - `Conflict` - if configuration settings conflict with each other
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate an optional timeout
    ///
    /// `None` means "block forever" and is always valid.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if:
    /// - The timeout duration is zero
    /// - The timeout duration exceeds 1 hour (3600 seconds)
    pub fn validate_timeout(timeout: Option<Duration>, name: &str) -> ConfigResult<()> {
        let Some(timeout) = timeout else {
            return Ok(());
        };

        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero, use None to block"
            )));
        }

        if timeout.as_secs() > 3600 {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 hour"
            )));
        }

        Ok(())
    }

    /// Validate numeric range
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the value is outside
    /// the specified range [min, max] (inclusive).
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> ConfigResult<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between {min} and {max}, got {value}"
            )));
        }

        Ok(())
    }
}

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        error::illegal_argument().with(err)
    }
}

/// Converts an optional timeout into the millisecond form used by socket
/// operations, where non-positive means "block forever".
#[must_use]
pub fn timeout_millis(timeout: Option<Duration>) -> i64 {
    match timeout {
        None => 0,
        Some(timeout) => i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_timeout_is_valid() {
        assert!(ConfigValidator::validate_timeout(None, "connect timeout").is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ConfigValidator::validate_timeout(Some(Duration::ZERO), "io timeout").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidTimeout(_)));
        assert_eq!(Error::from(err), error::illegal_argument());
    }

    #[test]
    fn timeout_millis_never_rounds_to_blocking() {
        assert_eq!(timeout_millis(None), 0);
        assert_eq!(timeout_millis(Some(Duration::from_micros(10))), 1);
        assert_eq!(timeout_millis(Some(Duration::from_millis(1500))), 1500);
    }
}
