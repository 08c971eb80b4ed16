use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicI64, Ordering};

use socket2::{Domain, Protocol, SockAddr, Type};

use super::{RawHandle, bounded};
use crate::error::{self, Result};
use crate::io::{Closer, Reader, Writer};
use crate::resolve;
use crate::sys::{self, Backend, Handle, Interest, Platform};
use crate::telemetry::global_stats;

/// A UDP socket, optionally with a default peer.
pub struct Datagram {
    handle: Handle,
    peer: Option<SocketAddr>,
    timeout: AtomicI64,
}

/// Opens a UDP socket whose `write` sends to `host:port`.
///
/// No packet is sent and nothing is bound until the first write.
pub fn connect_udp(host: &str, port: u16) -> Result<Datagram> {
    let ip = resolve::lookup_address(host)?;
    let peer = SocketAddr::new(ip, port);
    let socket = Platform::create(Domain::for_address(peer), Type::DGRAM, Some(Protocol::UDP))?;

    tracing::debug!("udp socket for peer {}", peer);
    Ok(Datagram::new(Handle::new(socket), Some(peer)))
}

/// Binds a UDP socket on every IPv4 interface.
pub fn listen_udp(port: u16) -> Result<Datagram> {
    let socket = Platform::create(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port);
    socket.bind(&SockAddr::from(addr))?;

    tracing::debug!("udp socket bound on port {}", port);
    Ok(Datagram::new(Handle::new(socket), None))
}

impl Datagram {
    fn new(handle: Handle, peer: Option<SocketAddr>) -> Self {
        Datagram {
            handle,
            peer,
            timeout: AtomicI64::new(0),
        }
    }

    /// Sets the budget, in milliseconds, for each subsequent read and write.
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

    /// Receives one datagram. An empty datagram reads as `eof`.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.read_from(buf).map(|(n, _, _)| n)
    }

    /// Receives one datagram and reports its sender.
    pub fn read_from(&self, buf: &mut [u8]) -> Result<(usize, IpAddr, u16)> {
        let socket = self.handle.socket()?;
        let (n, from) = bounded(socket, Interest::Read, self.timeout(), || sys::recv_from(socket, buf))?;
        if n == 0 {
            return Err(error::eof());
        }

        let from = from.as_socket().ok_or_else(error::illegal_state)?;
        global_stats().record_read(n);
        Ok((n, from.ip(), from.port()))
    }

    /// Sends `buf` to the default peer.
    ///
    /// # Errors
    ///
    /// `illegal_state` when the socket was not created by [`connect_udp`].
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let peer = self.peer.ok_or_else(error::illegal_state)?;
        self.write_to(buf, peer.ip(), peer.port())
    }

    pub fn write_to(&self, buf: &[u8], addr: IpAddr, port: u16) -> Result<usize> {
        let socket = self.handle.socket()?;
        let target = SockAddr::from(SocketAddr::new(addr, port));
        let n = bounded(socket, Interest::Write, self.timeout(), || socket.send_to(buf, &target))?;

        global_stats().record_written(n);
        Ok(n)
    }

    pub fn close(&self) -> Result<()> {
        self.handle.close()
    }

    /// The default peer set by [`connect_udp`].
    #[must_use]
    pub fn remote_address(&self) -> Option<IpAddr> {
        self.peer.map(|peer| peer.ip())
    }

    #[must_use]
    pub fn remote_port(&self) -> Option<u16> {
        self.peer.map(|peer| peer.port())
    }

    pub fn local_port(&self) -> Result<u16> {
        resolve::lookup_port(&self.handle)
    }

    #[must_use]
    pub fn raw_handle(&self) -> RawHandle {
        self.handle.raw()
    }
}

impl Reader for &Datagram {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Datagram::read(self, buf)
    }
}

impl Writer for &Datagram {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Datagram::write(self, buf)
    }
}

impl Reader for Datagram {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Datagram::read(self, buf)
    }
}

impl Writer for Datagram {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Datagram::write(self, buf)
    }
}

impl Closer for Datagram {
    fn close(&mut self) -> Result<()> {
        Datagram::close(self)
    }
}

impl fmt::Debug for Datagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datagram")
            .field("handle", &self.handle)
            .field("peer", &self.peer)
            .field("timeout", &self.timeout())
            .finish()
    }
}
