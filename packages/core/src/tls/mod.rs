//! TLS over the plain socket engine
//!
//! rustls client and server sessions driven over [`crate::net::Connection`]
//! with the same deadline and error contract as plain sockets.

pub mod client;
pub mod config;
pub(crate) mod context;
pub mod errors;
pub mod server;
pub mod session;
pub(crate) mod verifier;

pub use client::connect_secure;
pub use config::TlsConfig;
pub use errors::TlsSetupError;
pub use server::{SecureListener, listen_secure};
pub use session::SecureConnection;
