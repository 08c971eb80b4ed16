//! Platform socket backends
//!
//! socket2 covers creation, connect, send and receive on every platform.
//! The backends supply what differs between POSIX and Winsock: one-time
//! library setup, the raw error tables, readiness polling, the raw close,
//! and which raw connect results mean "still in progress".

use std::io;
use std::mem::MaybeUninit;
use std::net::IpAddr;
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::deadline::Deadline;
use crate::error::{OsCode, ResolverCode, Result};

pub(crate) mod handle;
#[cfg(unix)]
pub(crate) mod unix;
#[cfg(windows)]
pub(crate) mod windows;

pub(crate) use handle::Handle;

#[cfg(unix)]
pub(crate) type Platform = unix::Posix;
#[cfg(windows)]
pub(crate) type Platform = windows::Winsock;

/// The platform's raw descriptor type.
#[cfg(unix)]
pub type RawHandle = std::os::fd::RawFd;
#[cfg(windows)]
pub type RawHandle = std::os::windows::io::RawSocket;

/// What a readiness wait is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interest {
    Read,
    Write,
    /// Writable or exceptional, the completion signal of a pending connect.
    Connect,
}

pub(crate) trait Backend {
    /// Raw OS error values, first match wins.
    const OS_ERRORS: &'static [(i32, OsCode)];
    /// Raw resolver status values, first match wins.
    const RESOLVER_ERRORS: &'static [(i32, ResolverCode)];
    /// The listen backlog used when none is configured.
    const MAX_BACKLOG: i32;

    /// Process-wide library setup. Idempotent.
    fn init();

    /// Whether a raw connect result means the attempt is still running.
    fn is_connect_in_progress(raw: i32) -> bool;

    /// Whether a raw connect result means the socket is already connected.
    fn is_already_connected(raw: i32) -> bool;

    /// Waits up to `timeout` for `interest`. `Ok(false)` means the wait
    /// timed out with nothing ready.
    fn poll(socket: &Socket, interest: Interest, timeout: Duration) -> io::Result<bool>;

    /// Releases the descriptor without dropping the owning `Socket`.
    fn close_raw(socket: &Socket) -> io::Result<()>;

    /// Resolves `host` with the platform resolver.
    fn resolve(host: &str) -> Result<Vec<IpAddr>>;

    fn create(domain: Domain, ty: Type, protocol: Option<Protocol>) -> io::Result<Socket> {
        Self::init();
        Socket::new(domain, ty, protocol)
    }

    fn set_blocking(socket: &Socket, blocking: bool) -> io::Result<()> {
        socket.set_nonblocking(!blocking)
    }

    /// Takes the pending error of a socket (`SO_ERROR`).
    fn pending_error(socket: &Socket) -> io::Result<Option<io::Error>> {
        socket.take_error()
    }
}

/// Polls for `interest` until ready or until `deadline` runs out.
///
/// Interrupted waits are resumed with the budget recomputed from elapsed
/// time, so a signal never extends the total wait. An interruption that
/// lands after the budget is spent reports `Ok(false)`, same as a timeout.
pub(crate) fn wait(socket: &Socket, interest: Interest, deadline: &Deadline) -> io::Result<bool> {
    loop {
        if let Some(outcome) = settle(Platform::poll(socket, interest, deadline.remaining()), deadline) {
            return outcome;
        }
        tracing::trace!("readiness wait interrupted, resuming");
    }
}

/// Final result of one poll, or `None` when the wait should resume.
fn settle(outcome: io::Result<bool>, deadline: &Deadline) -> Option<io::Result<bool>> {
    match outcome {
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
            if deadline.is_expired() {
                Some(Ok(false))
            } else {
                None
            }
        }
        other => Some(other),
    }
}

pub(crate) fn recv_from(socket: &Socket, buf: &mut [u8]) -> io::Result<(usize, SockAddr)> {
    #[allow(unsafe_code)]
    // SAFETY: recv_from never de-initializes bytes; it only writes into the buffer.
    let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
    socket.recv_from(uninit)
}

pub(crate) fn recv(socket: &Socket, buf: &mut [u8]) -> io::Result<usize> {
    #[allow(unsafe_code)]
    // SAFETY: as above, recv only writes initialized bytes.
    let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
    socket.recv(uninit)
}
