//! sockline public API
//!
//! Blocking TCP, UDP and TLS sockets where every operation either blocks or
//! runs against a millisecond budget, with one portable error taxonomy.
//! The free functions from `sockline_core` are re-exported as-is; [`Sockline`]
//! adds a fluent builder on top of them.
//!
//! ```no_run
//! use std::time::Duration;
//! use sockline::Sockline;
//!
//! let conn = Sockline::tcp()
//!     .connect_timeout(Duration::from_secs(1))
//!     .io_timeout(Duration::from_millis(500))
//!     .nodelay()
//!     .connect("localhost", 8080)?;
//! conn.write_full(b"message\0")?;
//! # Ok::<(), sockline::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::{SocketBuilder, Tcp, Tls, Udp};

// Re-export the engine so callers only depend on this crate
pub use sockline_core::config::{ConfigurationError, SocketConfig, Validator};
pub use sockline_core::error::{self, BaseCode, Code, Error, Kind, OsCode, ResolverCode, Result, TlsCode};
pub use sockline_core::io::{Closer, Reader, Writer};
pub use sockline_core::telemetry::{SocketStatsSnapshot, global_stats};
pub use sockline_core::{
    Connection, Datagram, Listener, SecureConnection, SecureListener, TlsConfig, connect_secure, connect_tcp,
    connect_udp, connect_with, listen_secure, listen_tcp, listen_udp, listen_with,
};

/// Main entry point providing static builder methods
pub struct Sockline;

impl Sockline {
    /// Start building a TCP connection or listener
    #[must_use]
    pub fn tcp() -> SocketBuilder<Tcp> {
        SocketBuilder::tcp()
    }

    /// Start building a UDP socket
    #[must_use]
    pub fn udp() -> SocketBuilder<Udp> {
        SocketBuilder::udp()
    }

    /// Start building a TLS connection or listener with default trust settings
    ///
    /// Shorthand for `Sockline::tcp().tls(TlsConfig::default())`
    #[must_use]
    pub fn tls() -> SocketBuilder<Tls> {
        SocketBuilder::tcp().tls(TlsConfig::default())
    }
}
