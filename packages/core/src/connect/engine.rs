//! Connection establishment
//!
//! With a positive budget the socket is switched to non-blocking mode and
//! `connect` is driven to completion by readiness polls. Every poll waits
//! only for what is left of the budget, so retries after spurious wakeups or
//! interrupted waits never extend the total time spent.

use std::net::SocketAddr;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::deadline::Deadline;
use crate::error::{self, Result};
use crate::net::Connection;
use crate::resolve;
use crate::sys::{self, Backend, Handle, Interest, Platform};
use crate::telemetry::{SocketStats, global_stats};

/// Connects to `host:port` within `timeout_ms`.
///
/// A non-positive timeout performs one blocking `connect` and never reports
/// `timedout` itself. Resolver, socket, connect and pending-socket errors are
/// returned as classified; the socket is closed before any error returns.
pub fn connect_tcp(host: &str, port: u16, timeout_ms: i64) -> Result<Connection> {
    let stats = global_stats();
    SocketStats::bump(&stats.connect_attempts);

    tracing::debug!("connecting to {}:{} (timeout {} ms)", host, port, timeout_ms);
    let result = establish(host, port, timeout_ms);

    match &result {
        Ok(conn) => {
            SocketStats::bump(&stats.connections_established);
            tracing::debug!("connected to {}:{}", conn.remote_address(), port);
        }
        Err(e) if e.is_timeout() => {
            SocketStats::bump(&stats.connect_timeouts);
            tracing::debug!("connect to {}:{} timed out after {} ms", host, port, timeout_ms);
        }
        Err(e) => {
            SocketStats::bump(&stats.connect_failures);
            tracing::debug!("connect to {}:{} failed: {}", host, port, e);
        }
    }

    result
}

fn establish(host: &str, port: u16, timeout_ms: i64) -> Result<Connection> {
    let ip = resolve::lookup_address(host)?;
    let addr = SocketAddr::new(ip, port);
    let target = SockAddr::from(addr);

    let socket = Platform::create(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    match Deadline::from_millis(timeout_ms) {
        None => socket.connect(&target)?,
        Some(deadline) => connect_within(&socket, &target, &deadline)?,
    }

    Ok(Connection::new(Handle::new(socket), ip, port))
}

fn connect_within(socket: &Socket, target: &SockAddr, deadline: &Deadline) -> Result<()> {
    Platform::set_blocking(socket, false)?;

    match socket.connect(target) {
        Ok(()) => {}
        Err(e) if e.raw_os_error().is_some_and(Platform::is_connect_in_progress) => {
            await_connected(socket, deadline)?;
        }
        Err(e) => return Err(e.into()),
    }

    Platform::set_blocking(socket, true)?;
    Ok(())
}

/// Polls until the pending connect resolves or the budget runs out.
fn await_connected(socket: &Socket, deadline: &Deadline) -> Result<()> {
    loop {
        if deadline.is_expired() {
            return Err(error::timed_out());
        }

        if !sys::wait(socket, Interest::Connect, deadline)? {
            return Err(error::timed_out());
        }

        let Some(pending) = Platform::pending_error(socket)? else {
            return Ok(());
        };

        match pending.raw_os_error() {
            Some(raw) if Platform::is_already_connected(raw) => return Ok(()),
            Some(raw) if Platform::is_connect_in_progress(raw) => {
                tracing::trace!(
                    "connect still in progress, {} ms left",
                    deadline.remaining_millis()
                );
            }
            _ => return Err(pending.into()),
        }
    }
}
