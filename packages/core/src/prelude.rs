//! Common imports
//!
//! ```
//! use sockline_core::prelude::*;
//! ```

pub use crate::config::{SocketConfig, Validator};
pub use crate::connect::{connect_tcp, connect_with};
pub use crate::error::{Error, Kind, Result};
pub use crate::io::{Closer, Reader, Writer};
pub use crate::net::{Connection, Datagram, Listener, connect_udp, listen_tcp, listen_udp, listen_with};
pub use crate::tls::{SecureConnection, SecureListener, TlsConfig, connect_secure, listen_secure};
