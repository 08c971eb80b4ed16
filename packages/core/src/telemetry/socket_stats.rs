//! Process-wide socket statistics with cache-padded atomic counters
//!
//! Counters are updated on the hot path with relaxed atomics and read through
//! [`SocketStats::snapshot`]. Each counter sits on its own cache line so
//! threads driving different connections do not contend.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

static GLOBAL: SocketStats = SocketStats::new();

/// The statistics shared by every socket in the process.
#[must_use]
pub fn global_stats() -> &'static SocketStats {
    &GLOBAL
}

/// Lock-free socket statistics
#[derive(Debug, Default)]
pub struct SocketStats {
    /// Connection attempts started, TCP and TLS
    pub connect_attempts: CachePadded<AtomicU64>,
    /// Connections that completed establishment
    pub connections_established: CachePadded<AtomicU64>,
    /// Connection attempts that ran out of budget
    pub connect_timeouts: CachePadded<AtomicU64>,
    /// Connection attempts that failed for any other reason
    pub connect_failures: CachePadded<AtomicU64>,
    /// Connections accepted by listeners
    pub accepted: CachePadded<AtomicU64>,
    pub bytes_read: CachePadded<AtomicU64>,
    pub bytes_written: CachePadded<AtomicU64>,
    /// Reads, writes and accepts that ran out of budget
    pub io_timeouts: CachePadded<AtomicU64>,
    pub tls_handshakes: CachePadded<AtomicU64>,
    pub tls_handshake_failures: CachePadded<AtomicU64>,
}

/// Immutable snapshot of socket statistics at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SocketStatsSnapshot {
    pub connect_attempts: u64,
    pub connections_established: u64,
    pub connect_timeouts: u64,
    pub connect_failures: u64,
    pub accepted: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub io_timeouts: u64,
    pub tls_handshakes: u64,
    pub tls_handshake_failures: u64,
}

impl SocketStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_attempts: CachePadded::new(AtomicU64::new(0)),
            connections_established: CachePadded::new(AtomicU64::new(0)),
            connect_timeouts: CachePadded::new(AtomicU64::new(0)),
            connect_failures: CachePadded::new(AtomicU64::new(0)),
            accepted: CachePadded::new(AtomicU64::new(0)),
            bytes_read: CachePadded::new(AtomicU64::new(0)),
            bytes_written: CachePadded::new(AtomicU64::new(0)),
            io_timeouts: CachePadded::new(AtomicU64::new(0)),
            tls_handshakes: CachePadded::new(AtomicU64::new(0)),
            tls_handshake_failures: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Create a snapshot of the current statistics.
    ///
    /// Each value is read independently with relaxed ordering; the snapshot
    /// is consistent per counter, not across counters.
    #[inline]
    pub fn snapshot(&self) -> SocketStatsSnapshot {
        SocketStatsSnapshot {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            connections_established: self.connections_established.load(Ordering::Relaxed),
            connect_timeouts: self.connect_timeouts.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            io_timeouts: self.io_timeouts.load(Ordering::Relaxed),
            tls_handshakes: self.tls_handshakes.load(Ordering::Relaxed),
            tls_handshake_failures: self.tls_handshake_failures.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn record_read(&self, n: usize) {
        self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_written(&self, n: usize) {
        self.bytes_written.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn bump(counter: &CachePadded<AtomicU64>) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_updates() {
        let stats = SocketStats::new();
        SocketStats::bump(&stats.connect_attempts);
        SocketStats::bump(&stats.connect_attempts);
        stats.record_read(10);
        stats.record_written(3);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.connect_attempts, 2);
        assert_eq!(snapshot.bytes_read, 10);
        assert_eq!(snapshot.bytes_written, 3);
        assert_eq!(snapshot.accepted, 0);
    }
}
