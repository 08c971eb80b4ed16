//! Plain TCP options and terminal methods

use std::time::Duration;

use sockline_core::config::SocketConfig;
use sockline_core::{Connection, Listener, Result, TlsConfig, connect_with, listen_with};

use crate::builder::core::{SocketBuilder, Tcp, Tls};

impl SocketBuilder<Tcp> {
    /// Disable Nagle's algorithm on connected sockets
    #[must_use]
    pub fn nodelay(mut self) -> Self {
        self.config.nodelay = true;
        self
    }

    /// Enable keep-alive probes after `idle` without traffic
    #[must_use]
    pub fn keepalive(mut self, idle: Duration) -> Self {
        self.config.keepalive = Some(idle);
        self
    }

    #[must_use]
    pub fn reuse_address(mut self, reuse: bool) -> Self {
        self.config.reuse_address = reuse;
        self
    }

    #[must_use]
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.config.backlog = Some(backlog);
        self
    }

    /// Switch to TLS using `config` for trust and identity
    ///
    /// Timeouts carry over; the remaining TCP options do not apply to
    /// secure sockets.
    #[must_use]
    pub fn tls(self, config: TlsConfig) -> SocketBuilder<Tls> {
        SocketBuilder {
            config: SocketConfig {
                connect_timeout: self.config.connect_timeout,
                io_timeout: self.config.io_timeout,
                ..SocketConfig::default()
            },
            state: Tls { config },
            debug_enabled: self.debug_enabled,
        }
    }

    /// Connect to `host:port` and apply the configured options
    ///
    /// # Errors
    ///
    /// `illegal_argument` for an invalid configuration, otherwise whatever
    /// [`sockline_core::connect_tcp`] reports.
    pub fn connect(self, host: &str, port: u16) -> Result<Connection> {
        if self.debug_enabled {
            tracing::debug!("Sockline: TCP connect {}:{} with {:?}", host, port, self.config);
        }
        connect_with(host, port, &self.config)
    }

    /// Listen on `port`; the I/O timeout bounds each accept
    pub fn listen(self, port: u16) -> Result<Listener> {
        if self.debug_enabled {
            tracing::debug!("Sockline: TCP listen on {} with {:?}", port, self.config);
        }
        listen_with(port, &self.config)
    }
}
