//! Outbound TCP connections
//!
//! [`connect_tcp`] is the engine entry point; [`connect_with`] applies a
//! whole [`SocketConfig`] to the established connection.

pub mod engine;

pub use engine::connect_tcp;

use crate::config::{SocketConfig, Validator, timeout_millis};
use crate::error::Result;
use crate::net::Connection;

/// Connects using `config` for the budget and socket options.
///
/// The I/O timeout, nodelay and keep-alive settings are applied after the
/// connection is established.
pub fn connect_with(host: &str, port: u16, config: &SocketConfig) -> Result<Connection> {
    config.validate()?;

    let conn = connect_tcp(host, port, timeout_millis(config.connect_timeout))?;
    apply(&conn, config)?;
    Ok(conn)
}

pub(crate) fn apply(conn: &Connection, config: &SocketConfig) -> Result<()> {
    if config.nodelay {
        conn.set_no_delay(true)?;
    }

    if let Some(keepalive) = config.keepalive {
        conn.set_keep_alive(true)?;
        conn.set_keep_alive_period(i64::try_from(keepalive.as_secs()).unwrap_or(i64::MAX))?;
    }

    conn.set_timeout(timeout_millis(config.io_timeout))
}
