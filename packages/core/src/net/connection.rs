use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use socket2::TcpKeepalive;

use super::{RawHandle, bounded};
use crate::error::{self, Result};
use crate::io::{Closer, Reader, Writer};
use crate::resolve;
use crate::sys::{self, Backend, Handle, Interest, Platform};
use crate::telemetry::global_stats;

/// An established TCP connection.
///
/// Every method takes `&self`, so a connection can be shared through `Arc`
/// and closed from another thread to cancel a blocked operation.
pub struct Connection {
    handle: Handle,
    remote_addr: IpAddr,
    remote_port: u16,
    timeout: AtomicI64,
}

impl Connection {
    pub(crate) fn new(handle: Handle, remote_addr: IpAddr, remote_port: u16) -> Self {
        Connection {
            handle,
            remote_addr,
            remote_port,
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

    /// Reads at most `buf.len()` bytes within the configured timeout.
    ///
    /// # Errors
    ///
    /// `eof` when the peer has closed the stream, `timedout` when nothing
    /// arrives in time, otherwise the classified socket error.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let socket = self.handle.socket()?;
        let n = bounded(socket, Interest::Read, self.timeout(), || sys::recv(socket, buf))?;
        if n == 0 {
            return Err(error::eof());
        }

        global_stats().record_read(n);
        Ok(n)
    }

    /// Writes at most `buf.len()` bytes within the configured timeout.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let socket = self.handle.socket()?;
        let n = bounded(socket, Interest::Write, self.timeout(), || socket.send(buf))?;

        global_stats().record_written(n);
        Ok(n)
    }

    /// Reads exactly `buf.len()` bytes.
    pub fn read_full(&self, buf: &mut [u8]) -> Result<()> {
        Reader::read_full(&mut &*self, buf)
    }

    /// Writes all of `buf`.
    pub fn write_full(&self, buf: &[u8]) -> Result<()> {
        Writer::write_full(&mut &*self, buf)
    }

    /// Reads one NUL-terminated line, see [`Reader::read_line`].
    pub fn read_line(&self, buf: &mut [u8]) -> Result<usize> {
        Reader::read_line(&mut &*self, buf)
    }

    /// Closes the socket. Safe to call repeatedly and from other threads.
    pub fn close(&self) -> Result<()> {
        self.handle.close()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub fn set_keep_alive(&self, enable: bool) -> Result<()> {
        self.handle.socket()?.set_keepalive(enable)?;
        Ok(())
    }

    /// Sets the keep-alive idle period in seconds.
    ///
    /// # Errors
    ///
    /// `illegal_argument` for periods below one second.
    pub fn set_keep_alive_period(&self, secs: i64) -> Result<()> {
        if secs < 1 {
            return Err(error::illegal_argument());
        }

        let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(secs.unsigned_abs()));
        self.handle.socket()?.set_tcp_keepalive(&keepalive)?;
        Ok(())
    }

    pub fn set_no_delay(&self, enable: bool) -> Result<()> {
        self.handle.socket()?.set_tcp_nodelay(enable)?;
        Ok(())
    }

    #[must_use]
    pub fn remote_address(&self) -> IpAddr {
        self.remote_addr
    }

    #[must_use]
    pub fn remote_port(&self) -> u16 {
        self.remote_port
    }

    /// The local port this connection is bound to.
    pub fn local_port(&self) -> Result<u16> {
        resolve::lookup_port(&self.handle)
    }

    #[must_use]
    pub fn raw_handle(&self) -> RawHandle {
        self.handle.raw()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.handle)
            .field("remote_addr", &self.remote_addr)
            .field("remote_port", &self.remote_port)
            .field("timeout", &self.timeout())
            .finish()
    }
}

impl Reader for &Connection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Connection::read(self, buf)
    }
}

impl Writer for &Connection {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Connection::write(self, buf)
    }
}

impl Reader for Connection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Connection::read(self, buf)
    }
}

impl Writer for Connection {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Connection::write(self, buf)
    }
}

impl Closer for Connection {
    fn close(&mut self) -> Result<()> {
        Connection::close(self)
    }
}

impl Closer for &Connection {
    fn close(&mut self) -> Result<()> {
        Connection::close(self)
    }
}

// std adapters (and rustls) expect end of stream as Ok(0)
impl io::Read for &Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match Connection::read(self, buf) {
            Err(e) if e.is_eof() => Ok(0),
            other => other.map_err(|e| e.into_io()),
        }
    }
}

impl io::Write for &Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Connection::write(self, buf).map_err(|e| e.into_io())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

impl io::Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
