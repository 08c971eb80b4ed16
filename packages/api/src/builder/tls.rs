//! TLS options and terminal methods

use std::path::PathBuf;

use sockline_core::config::{Validator, timeout_millis};
use sockline_core::{Result, SecureConnection, SecureListener, TlsConfig, connect_secure, listen_secure};

use crate::builder::core::{SocketBuilder, Tls};

impl SocketBuilder<Tls> {
    /// Trust only the certificates in `path` (PEM)
    #[must_use]
    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state.config = self.state.config.with_ca_file(path);
        self
    }

    /// Present `cert_file` and `key_file` (PEM)
    ///
    /// Required for listeners; a client with an identity offers it for
    /// mutual authentication.
    #[must_use]
    pub fn identity(mut self, cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        self.state.config = self.state.config.with_identity(cert_file, key_file);
        self
    }

    /// Accept any server certificate. Testing only.
    #[must_use]
    pub fn insecure_skip_verify(mut self) -> Self {
        self.state.config = self.state.config.with_insecure_skip_verify(true);
        self
    }

    #[must_use]
    pub fn native_roots(mut self, enabled: bool) -> Self {
        self.state.config = self.state.config.with_native_roots(enabled);
        self
    }

    /// Offer `protocol` through ALPN, in call order
    #[must_use]
    pub fn alpn(mut self, protocol: &[u8]) -> Self {
        self.state.config.alpn_protocols.push(protocol.to_vec());
        self
    }

    /// Verify the server as `name` instead of the host passed to `connect`
    #[must_use]
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.state.config = self.state.config.with_server_name(name);
        self
    }

    /// The TLS settings the terminal method will use
    #[must_use]
    pub fn tls_config(&self) -> &TlsConfig {
        &self.state.config
    }

    /// Connect to `host:port` and complete the handshake
    ///
    /// The connect timeout bounds establishment and handshake together;
    /// the I/O timeout applies to the session afterwards.
    ///
    /// # Errors
    ///
    /// `illegal_argument` for an invalid configuration, a TLS error for
    /// context or handshake failures, otherwise the transport error.
    pub fn connect(self, host: &str, port: u16) -> Result<SecureConnection> {
        self.config.validate()?;
        if self.debug_enabled {
            tracing::debug!("Sockline: TLS connect {}:{} with {:?}", host, port, self.state.config);
        }

        let conn = connect_secure(host, port, timeout_millis(self.config.connect_timeout), &self.state.config)?;
        conn.set_timeout(timeout_millis(self.config.io_timeout))?;
        Ok(conn)
    }

    /// Listen on `port`; the I/O timeout bounds each accept and its handshake
    pub fn listen(self, port: u16) -> Result<SecureListener> {
        self.config.validate()?;
        if self.debug_enabled {
            tracing::debug!("Sockline: TLS listen on {}", port);
        }

        let listener = listen_secure(port, &self.state.config)?;
        listener.set_timeout(timeout_millis(self.config.io_timeout))?;
        Ok(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpn_protocols_keep_call_order() {
        let builder = SocketBuilder::tcp()
            .tls(TlsConfig::default())
            .alpn(b"h2")
            .alpn(b"http/1.1");
        assert_eq!(
            builder.tls_config().alpn_protocols,
            vec![b"h2".to_vec(), b"http/1.1".to_vec()]
        );
    }

    #[test]
    fn identity_sets_both_files() {
        let builder = SocketBuilder::tcp()
            .tls(TlsConfig::default())
            .identity("server.pem", "server.key");
        assert_eq!(builder.tls_config().cert_file, Some(PathBuf::from("server.pem")));
        assert_eq!(builder.tls_config().key_file, Some(PathBuf::from("server.key")));
    }
}
