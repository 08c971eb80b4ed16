use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicI64, Ordering};

use socket2::{Domain, Protocol, SockAddr, Type};

use super::{Connection, RawHandle, bounded};
use crate::config::{SocketConfig, Validator, timeout_millis};
use crate::connect;
use crate::error::{self, Result};
use crate::io::Closer;
use crate::resolve;
use crate::sys::{Backend, Handle, Interest, Platform};
use crate::telemetry::{SocketStats, global_stats};

/// A TCP socket listening on every IPv4 interface.
pub struct Listener {
    handle: Handle,
    timeout: AtomicI64,
}

/// Listens on `port` with address reuse and the platform's maximum backlog.
///
/// Port 0 picks an ephemeral port, see [`Listener::local_port`].
pub fn listen_tcp(port: u16) -> Result<Listener> {
    bind(port, true, Platform::MAX_BACKLOG)
}

/// Listens on `port` using `config` for reuse, backlog and accept timeout.
pub fn listen_with(port: u16, config: &SocketConfig) -> Result<Listener> {
    config.validate()?;

    let listener = bind(
        port,
        config.reuse_address,
        config.backlog.unwrap_or(Platform::MAX_BACKLOG),
    )?;
    listener.set_timeout(timeout_millis(config.io_timeout))?;
    Ok(listener)
}

fn bind(port: u16, reuse_address: bool, backlog: i32) -> Result<Listener> {
    let socket = Platform::create(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    if reuse_address {
        socket.set_reuse_address(true)?;
    }

    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port);
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(backlog)?;

    tracing::debug!("listening on port {} (backlog {})", port, backlog);
    Ok(Listener {
        handle: Handle::new(socket),
        timeout: AtomicI64::new(0),
    })
}

impl Listener {
    /// Sets the budget, in milliseconds, for each subsequent accept.
    ///
    /// A non-positive value blocks forever.
    pub fn set_timeout(&self, timeout_ms: i64) -> Result<()> {
        let socket = self.handle.socket()?;
        Platform::set_blocking(socket, timeout_ms <= 0)?;
        self.timeout.store(timeout_ms, Ordering::Release);
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> i64 {
        self.timeout.load(Ordering::Acquire)
    }

    /// Waits for the next inbound connection.
    ///
    /// The accepted connection is always in blocking mode with no timeout,
    /// whatever the listener's own timeout is.
    pub fn accept(&self) -> Result<Connection> {
        let socket = self.handle.socket()?;
        let (peer, addr) = bounded(socket, Interest::Read, self.timeout(), || socket.accept())?;
        Platform::set_blocking(&peer, true)?;

        let Some(addr) = addr.as_socket() else {
            return Err(error::illegal_state());
        };

        SocketStats::bump(&global_stats().accepted);
        tracing::debug!("accepted connection from {}", addr);
        Ok(Connection::new(Handle::new(peer), addr.ip(), addr.port()))
    }

    /// Accepts and applies `config`'s per-connection options.
    pub fn accept_with(&self, config: &SocketConfig) -> Result<Connection> {
        let conn = self.accept()?;
        connect::apply(&conn, config)?;
        Ok(conn)
    }

    /// The port this listener is bound to.
    pub fn local_port(&self) -> Result<u16> {
        resolve::lookup_port(&self.handle)
    }

    pub fn close(&self) -> Result<()> {
        self.handle.close()
    }

    #[must_use]
    pub fn raw_handle(&self) -> RawHandle {
        self.handle.raw()
    }
}

impl Closer for Listener {
    fn close(&mut self) -> Result<()> {
        Listener::close(self)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("handle", &self.handle)
            .field("timeout", &self.timeout())
            .finish()
    }
}
