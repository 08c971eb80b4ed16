//! Telemetry for the socket layer
//!
//! Process-wide counters for connects, accepts, bytes moved, timeouts and
//! TLS handshakes.

pub mod socket_stats;

pub use socket_stats::{SocketStats, SocketStatsSnapshot, global_stats};
