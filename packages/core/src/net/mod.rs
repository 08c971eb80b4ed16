//! Plain sockets
//!
//! TCP [`Connection`]s and [`Listener`]s and UDP [`Datagram`] sockets. All
//! share one per-operation discipline: a non-positive timeout blocks, a
//! positive one waits for readiness up to the timeout and then performs
//! exactly one non-blocking call.

use std::io;

use socket2::Socket;

use crate::deadline::Deadline;
use crate::error::{self, Error, Result};
use crate::sys::{self, Interest};
use crate::telemetry::{SocketStats, global_stats};

pub mod connection;
pub mod datagram;
pub mod listener;

pub use crate::sys::RawHandle;
pub use connection::Connection;
pub use datagram::{Datagram, connect_udp, listen_udp};
pub use listener::{Listener, listen_tcp, listen_with};

/// Runs `op` under `timeout_ms`.
///
/// With a positive timeout the socket must already be non-blocking. A
/// readiness report that turns out to be spurious (the call would still
/// block) waits again for whatever is left of the same budget.
pub(crate) fn bounded<T>(
    socket: &Socket,
    interest: Interest,
    timeout_ms: i64,
    mut op: impl FnMut() -> io::Result<T>,
) -> Result<T> {
    let Some(deadline) = Deadline::from_millis(timeout_ms) else {
        return op().map_err(Error::from);
    };

    loop {
        if !sys::wait(socket, interest, &deadline)? {
            SocketStats::bump(&global_stats().io_timeouts);
            tracing::trace!("{:?} wait timed out after {} ms", interest, timeout_ms);
            return Err(error::timed_out());
        }

        match op() {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if deadline.is_expired() {
                    SocketStats::bump(&global_stats().io_timeouts);
                    return Err(error::timed_out());
                }
            }
            other => return other.map_err(Error::from),
        }
    }
}
