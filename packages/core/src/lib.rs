//! # sockline core
//!
//! Blocking sockets with bounded time budgets. Every connect, accept, read
//! and write is either fully blocking (non-positive timeout) or bounded by a
//! millisecond deadline that is recomputed from elapsed wall-clock time, and
//! every failure is reported as one portable [`Error`] whose kind/code is
//! independent of the platform that produced it.
//!
//! ## Layout
//!
//! - [`error`]: the error taxonomy (base, OS, resolver, TLS)
//! - [`deadline`]: remaining-budget arithmetic shared by all operations
//! - [`connect`]: the non-blocking connect state machine
//! - [`net`]: TCP connections/listeners and UDP sockets
//! - [`io`]: `Reader`/`Writer`/`Closer` with `read_full`, `read_line`, `write_full`
//! - [`tls`]: rustls client and server sessions over the plain engine
//! - [`resolve`]: host name lookup used by the engine
//! - [`config`]: socket configuration with validation
//! - [`telemetry`]: process-wide lock-free counters
//!
//! Concurrency is thread-per-connection: the crate never spawns threads.
//! Plain connections can be shared through `Arc` and closed from any thread.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod deadline;
pub mod error;
pub mod io;
pub mod net;
pub mod resolve;
pub mod telemetry;
pub mod tls;

pub(crate) mod sys;

pub mod prelude;

pub use crate::connect::{connect_tcp, connect_with};
pub use crate::error::{Error, Kind, Result};
pub use crate::net::{Connection, Datagram, Listener, connect_udp, listen_tcp, listen_udp, listen_with};
pub use crate::tls::{SecureConnection, SecureListener, TlsConfig, connect_secure, listen_secure};
