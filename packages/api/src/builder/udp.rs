//! UDP terminal methods

use sockline_core::config::{Validator, timeout_millis};
use sockline_core::{Datagram, Result, connect_udp, listen_udp};

use crate::builder::core::{SocketBuilder, Udp};

impl SocketBuilder<Udp> {
    /// Open a socket whose `write` sends to `host:port`
    ///
    /// # Errors
    ///
    /// `illegal_argument` for an invalid configuration, a resolver error if
    /// `host` does not resolve.
    pub fn connect(self, host: &str, port: u16) -> Result<Datagram> {
        self.config.validate()?;
        if self.debug_enabled {
            tracing::debug!("Sockline: UDP socket for {}:{}", host, port);
        }

        let socket = connect_udp(host, port)?;
        socket.set_timeout(timeout_millis(self.config.io_timeout))?;
        Ok(socket)
    }

    /// Bind on `port`; port 0 picks an ephemeral port
    pub fn bind(self, port: u16) -> Result<Datagram> {
        self.config.validate()?;
        if self.debug_enabled {
            tracing::debug!("Sockline: UDP bind on {}", port);
        }

        let socket = listen_udp(port)?;
        socket.set_timeout(timeout_millis(self.config.io_timeout))?;
        Ok(socket)
    }
}
