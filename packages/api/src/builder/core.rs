//! Core `SocketBuilder` structures and shared options
//!
//! Contains the builder struct, its transport states and the timeout
//! settings every transport understands.

use std::fmt;
use std::time::Duration;

use sockline_core::TlsConfig;
use sockline_core::config::SocketConfig;

/// State marker for plain TCP
#[derive(Debug, Clone, Copy, Default)]
pub struct Tcp;

/// State marker for UDP
#[derive(Debug, Clone, Copy, Default)]
pub struct Udp;

/// TLS state
///
/// Stores the trust and identity settings used for the handshake.
#[derive(Debug, Clone, Default)]
pub struct Tls {
    pub config: TlsConfig,
}

/// Fluent builder for sockets
///
/// Type parameter `S` selects the transport:
/// - `Tcp`: plain connections and listeners, default state
/// - `Udp`: datagram sockets
/// - `Tls`: secure connections and listeners, reached through [`SocketBuilder::tls`]
#[derive(Clone)]
pub struct SocketBuilder<S = Tcp> {
    pub(crate) config: SocketConfig,
    pub(crate) state: S,
    pub(crate) debug_enabled: bool,
}

impl SocketBuilder<Tcp> {
    #[must_use]
    pub fn tcp() -> Self {
        Self::with_state(Tcp)
    }
}

impl SocketBuilder<Udp> {
    #[must_use]
    pub fn udp() -> Self {
        Self::with_state(Udp)
    }
}

impl<S> SocketBuilder<S> {
    fn with_state(state: S) -> Self {
        SocketBuilder {
            config: SocketConfig::default(),
            state,
            debug_enabled: false,
        }
    }

    /// Enable debug logging of what the terminal method does
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Bound connection establishment (and the TLS handshake) by `timeout`
    ///
    /// # Examples
    /// ```no_run
    /// use std::time::Duration;
    /// use sockline::Sockline;
    ///
    /// let conn = Sockline::tcp()
    ///     .connect_timeout(Duration::from_millis(250))
    ///     .connect("example.com", 80);
    /// ```
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Bound each read, write and accept by `timeout`
    #[must_use]
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout = Some(timeout);
        self
    }

    /// Replace every socket option at once
    #[must_use]
    pub fn socket_config(mut self, config: SocketConfig) -> Self {
        self.config = config;
        self
    }

    /// The socket options the terminal method will apply
    #[must_use]
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }
}

impl<S> fmt::Debug for SocketBuilder<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketBuilder")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("debug_enabled", &self.debug_enabled)
            .finish()
    }
}
