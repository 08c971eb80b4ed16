use rustls::ClientConnection;
use rustls::pki_types::ServerName;

use super::config::TlsConfig;
use super::context;
use super::errors::TlsSetupError;
use super::session::SecureConnection;
use crate::config::Validator;
use crate::connect::connect_tcp;
use crate::deadline::Deadline;
use crate::error::{self, Result};

/// Connects to `host:port` and completes a TLS handshake.
///
/// `timeout_ms` bounds connection establishment and the handshake together;
/// a non-positive value blocks. Unless `insecure_skip_verify` is set, a
/// server that presents no certificate or an unverifiable chain fails with
/// the `certificate` TLS code.
pub fn connect_secure(host: &str, port: u16, timeout_ms: i64, config: &TlsConfig) -> Result<SecureConnection> {
    config.validate()?;

    let client = context::client_config(config)?;
    let name = config.server_name.as_deref().unwrap_or(host);
    let server_name = ServerName::try_from(name.to_owned())
        .map_err(|_| TlsSetupError::InvalidServerName(name.to_owned()))?;

    let deadline = Deadline::from_millis(timeout_ms);
    let transport = connect_tcp(host, port, timeout_ms)?;
    if deadline.is_some_and(|d| d.is_expired()) {
        return Err(error::timed_out());
    }

    let session = ClientConnection::new(client, server_name)?;
    let mut conn = SecureConnection::new(session, transport);
    conn.handshake(deadline)?;

    if !config.insecure_skip_verify {
        conn.require_peer_certificate()?;
    }
    Ok(conn)
}
