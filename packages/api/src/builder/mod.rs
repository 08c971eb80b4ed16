//! Fluent socket builder modules
//!
//! [`SocketBuilder`] carries a [`sockline_core::config::SocketConfig`] and a
//! transport state; the terminal methods for each transport live in their
//! own module.

pub mod core;
pub mod tcp;
pub mod tls;
pub mod udp;

pub use self::core::{SocketBuilder, Tcp, Tls, Udp};
