//! Socket configuration
//!
//! Builder-style configuration applied by `connect_with` and `listen_with`.

use std::time::Duration;

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Options applied to sockets created by `connect_with` and `listen_with`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    /// Budget for connection establishment. `None` blocks until the OS gives up.
    pub connect_timeout: Option<Duration>,
    /// Per-operation budget for reads, writes and accepts. `None` blocks.
    pub io_timeout: Option<Duration>,
    pub nodelay: bool,
    /// Keep-alive idle time, or `None` to leave keep-alive off.
    pub keepalive: Option<Duration>,
    pub reuse_address: bool,
    /// Listen backlog. `None` uses the platform maximum.
    pub backlog: Option<i32>,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            io_timeout: None,
            nodelay: false,
            keepalive: None,
            reuse_address: true,
            backlog: None,
        }
    }
}

impl SocketConfig {
    /// Set the connection establishment budget
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use sockline_core::config::SocketConfig;
    ///
    /// let config = SocketConfig::default().with_connect_timeout(Some(Duration::from_secs(2)));
    /// assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));
    /// ```
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-operation I/O budget
    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Set TCP keep-alive idle time
    ///
    /// Enables keep-alive with the given idle period, or disables it with `None`.
    #[must_use]
    pub fn with_keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.keepalive = keepalive;
        self
    }

    #[must_use]
    pub fn with_reuse_address(mut self, reuse: bool) -> Self {
        self.reuse_address = reuse;
        self
    }

    #[must_use]
    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = Some(backlog);
        self
    }
}

impl Validator for SocketConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_timeout(self.connect_timeout, "connect timeout")?;
        ConfigValidator::validate_timeout(self.io_timeout, "io timeout")?;

        if let Some(keepalive) = self.keepalive
            && keepalive.as_secs() < 1
        {
            return Err(ConfigurationError::InvalidParameter(
                "keepalive period must be at least one second".to_string(),
            ));
        }

        if let Some(backlog) = self.backlog {
            ConfigValidator::validate_range(backlog, 1, i32::MAX, "backlog")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SocketConfig::default().validate().is_ok());
    }

    #[test]
    fn sub_second_keepalive_is_rejected() {
        let config = SocketConfig::default().with_keepalive(Some(Duration::from_millis(500)));
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn non_positive_backlog_is_rejected() {
        assert!(SocketConfig::default().with_backlog(0).validate().is_err());
        assert!(SocketConfig::default().with_backlog(16).validate().is_ok());
    }
}
