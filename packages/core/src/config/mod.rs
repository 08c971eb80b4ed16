//! Socket configuration
//!
//! Builder-style option sets with validation. TLS options live in
//! [`crate::tls::TlsConfig`] and share the validation helpers here.

pub mod socket;
pub mod validation;

pub use socket::SocketConfig;
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator, timeout_millis};
