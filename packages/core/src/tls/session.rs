use std::fmt;
use std::io::{self, Read, Write};
use std::net::IpAddr;

use crate::deadline::Deadline;
use crate::error::{self, Result};
use crate::io::{Closer, Reader, Writer};
use crate::net::{Connection, RawHandle};
use crate::telemetry::{SocketStats, global_stats};

/// A TLS session over an established [`Connection`].
///
/// Reads and writes keep the plain connection's contract: the transport's
/// timeout bounds each socket wait, end of stream is `eof`, socket failures
/// keep their OS classification. Closing sends `close_notify` first.
pub struct SecureConnection {
    session: rustls::Connection,
    transport: Connection,
    closed: bool,
}

impl SecureConnection {
    pub(crate) fn new(session: impl Into<rustls::Connection>, transport: Connection) -> Self {
        SecureConnection {
            session: session.into(),
            transport,
            closed: false,
        }
    }

    /// Drives the handshake to completion within `deadline`.
    ///
    /// Every socket operation waits only for what is left of the budget.
    /// The transport's own timeout is restored afterwards.
    pub(crate) fn handshake(&mut self, deadline: Option<Deadline>) -> Result<()> {
        let saved = self.transport.timeout();
        let result = self.run_handshake(deadline.as_ref());
        let restored = self.transport.set_timeout(saved);

        let stats = global_stats();
        match result.and(restored) {
            Ok(()) => {
                SocketStats::bump(&stats.tls_handshakes);
                tracing::debug!(
                    "TLS handshake with {} complete ({:?})",
                    self.transport.remote_address(),
                    self.session.protocol_version()
                );
                Ok(())
            }
            Err(e) => {
                SocketStats::bump(&stats.tls_handshake_failures);
                tracing::debug!("TLS handshake with {} failed: {}", self.transport.remote_address(), e);
                self.abort();
                Err(e)
            }
        }
    }

    fn run_handshake(&mut self, deadline: Option<&Deadline>) -> Result<()> {
        while self.session.is_handshaking() {
            self.arm(deadline)?;

            if self.session.wants_write() {
                self.session.write_tls(&mut &self.transport)?;
                continue;
            }

            if self.session.read_tls(&mut &self.transport)? == 0 {
                return Err(error::eof());
            }
            if let Err(e) = self.session.process_new_packets() {
                // deliver the alert rustls queued for the peer
                if let Err(flush) = self.flush_tls() {
                    tracing::trace!("TLS alert to {} not delivered: {}", self.transport.remote_address(), flush);
                }
                return Err(e.into());
            }
        }

        // queued post-handshake records, e.g. session tickets
        if self.session.wants_write() {
            self.arm(deadline)?;
            self.flush_tls()?;
        }
        Ok(())
    }

    /// Bounds the next socket operation by what is left of `deadline`.
    fn arm(&self, deadline: Option<&Deadline>) -> Result<()> {
        let Some(deadline) = deadline else {
            return Ok(());
        };
        if deadline.is_expired() {
            tracing::debug!(
                "TLS handshake with {} out of budget after {:?}",
                self.transport.remote_address(),
                deadline.elapsed()
            );
            return Err(error::timed_out());
        }
        self.transport.set_timeout(deadline.remaining_millis())
    }

    /// Fails unless the peer presented at least one certificate.
    pub(crate) fn require_peer_certificate(&mut self) -> Result<()> {
        let presented = self
            .session
            .peer_certificates()
            .is_some_and(|certs| !certs.is_empty());
        if presented {
            return Ok(());
        }

        tracing::debug!("peer {} presented no certificate", self.transport.remote_address());
        self.abort();
        Err(error::tls(error::TlsCode::Certificate, rustls::Error::NoCertificatesPresented))
    }

    /// Sets the budget, in milliseconds, for each socket wait.
    ///
    /// A non-positive value blocks forever.
    pub fn set_timeout(&self, timeout_ms: i64) -> Result<()> {
        self.transport.set_timeout(timeout_ms)
    }

    /// Reads decrypted application data.
    ///
    /// # Errors
    ///
    /// `eof` after the peer's `close_notify` or an unannounced close,
    /// `illegal_state` after [`SecureConnection::close`], otherwise the
    /// transport or TLS error.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(error::illegal_state());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            match self.session.reader().read(buf) {
                Ok(0) => return Err(error::eof()),
                Ok(n) => {
                    global_stats().record_read(n);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(error::eof()),
                Err(e) => return Err(e.into()),
            }

            self.flush_tls()?;
            if self.session.read_tls(&mut &self.transport)? == 0 {
                return Err(error::eof());
            }
            self.session.process_new_packets()?;
        }
    }

    /// Encrypts and sends application data.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(error::illegal_state());
        }

        let n = self.session.writer().write(buf)?;
        self.flush_tls()?;
        global_stats().record_written(n);
        Ok(n)
    }

    pub fn read_full(&mut self, buf: &mut [u8]) -> Result<()> {
        Reader::read_full(self, buf)
    }

    pub fn write_full(&mut self, buf: &[u8]) -> Result<()> {
        Writer::write_full(self, buf)
    }

    pub fn read_line(&mut self, buf: &mut [u8]) -> Result<usize> {
        Reader::read_line(self, buf)
    }

    /// Sends `close_notify` and closes the transport. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.session.send_close_notify();
        if let Err(e) = self.flush_tls() {
            tracing::debug!("close_notify to {} not delivered: {}", self.transport.remote_address(), e);
        }
        self.transport.close()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The protocol agreed through ALPN, if any.
    #[must_use]
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        self.session.alpn_protocol()
    }

    #[must_use]
    pub fn protocol_version(&self) -> Option<rustls::ProtocolVersion> {
        self.session.protocol_version()
    }

    #[must_use]
    pub fn remote_address(&self) -> IpAddr {
        self.transport.remote_address()
    }

    #[must_use]
    pub fn remote_port(&self) -> u16 {
        self.transport.remote_port()
    }

    pub fn local_port(&self) -> Result<u16> {
        self.transport.local_port()
    }

    #[must_use]
    pub fn raw_handle(&self) -> RawHandle {
        self.transport.raw_handle()
    }

    fn flush_tls(&mut self) -> Result<()> {
        while self.session.wants_write() {
            self.session.write_tls(&mut &self.transport)?;
        }
        Ok(())
    }

    // drop the transport without a close_notify after a failed handshake
    fn abort(&mut self) {
        self.closed = true;
        if let Err(e) = self.transport.close() {
            tracing::debug!("closing failed TLS transport: {}", e);
        }
    }
}

impl Drop for SecureConnection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::debug!("closing TLS connection on drop: {}", e);
        }
    }
}

impl Reader for SecureConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        SecureConnection::read(self, buf)
    }
}

impl Writer for SecureConnection {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        SecureConnection::write(self, buf)
    }
}

impl Closer for SecureConnection {
    fn close(&mut self) -> Result<()> {
        SecureConnection::close(self)
    }
}

impl io::Read for SecureConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match SecureConnection::read(self, buf) {
            Err(e) if e.is_eof() => Ok(0),
            other => other.map_err(|e| e.into_io()),
        }
    }
}

impl io::Write for SecureConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SecureConnection::write(self, buf).map_err(|e| e.into_io())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_tls().map_err(|e| e.into_io())
    }
}

impl fmt::Debug for SecureConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureConnection")
            .field("transport", &self.transport)
            .field("protocol_version", &self.session.protocol_version())
            .field("closed", &self.closed)
            .finish()
    }
}
