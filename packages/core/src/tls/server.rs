use std::fmt;
use std::sync::Arc;

use rustls::{ServerConfig, ServerConnection};

use super::config::TlsConfig;
use super::context;
use super::session::SecureConnection;
use crate::config::Validator;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::io::Closer;
use crate::net::{Listener, RawHandle, listen_tcp};

/// A TCP listener that hands out handshaken [`SecureConnection`]s.
pub struct SecureListener {
    listener: Listener,
    config: Arc<ServerConfig>,
}

/// Listens on `port` presenting the certificate and key from `config`.
///
/// The server context is built before the socket is opened, so unreadable
/// files and a key that does not match the certificate fail here rather
/// than on the first accept.
pub fn listen_secure(port: u16, config: &TlsConfig) -> Result<SecureListener> {
    config.validate()?;

    let server = context::server_config(config)?;
    let listener = listen_tcp(port)?;
    Ok(SecureListener {
        listener,
        config: server,
    })
}

impl SecureListener {
    /// Sets the budget, in milliseconds, for each accept and the handshake
    /// that follows it. A non-positive value blocks forever.
    pub fn set_timeout(&self, timeout_ms: i64) -> Result<()> {
        self.listener.set_timeout(timeout_ms)
    }

    /// Accepts one connection and completes the server handshake on it.
    pub fn accept(&self) -> Result<SecureConnection> {
        let timeout_ms = self.listener.timeout();
        let transport = self.listener.accept()?;

        let session = ServerConnection::new(self.config.clone())?;
        let mut conn = SecureConnection::new(session, transport);
        conn.handshake(Deadline::from_millis(timeout_ms))?;
        Ok(conn)
    }

    pub fn local_port(&self) -> Result<u16> {
        self.listener.local_port()
    }

    pub fn close(&self) -> Result<()> {
        self.listener.close()
    }

    #[must_use]
    pub fn raw_handle(&self) -> RawHandle {
        self.listener.raw_handle()
    }
}

impl Closer for SecureListener {
    fn close(&mut self) -> Result<()> {
        SecureListener::close(self)
    }
}

impl fmt::Debug for SecureListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureListener")
            .field("listener", &self.listener)
            .field("alpn_protocols", &self.config.alpn_protocols)
            .finish()
    }
}
