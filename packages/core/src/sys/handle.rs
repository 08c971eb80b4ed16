#![allow(unsafe_code)]

use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicBool, Ordering};

use socket2::Socket;

use super::{Backend, Platform, RawHandle};
use crate::error::{self, Result};

/// Owns one OS socket and closes it exactly once.
///
/// `close` may be called from any thread and any number of times; only the
/// first call reaches the OS. After close every access reports
/// `illegal_state`.
pub(crate) struct Handle {
    socket: ManuallyDrop<Socket>,
    closed: AtomicBool,
}

impl Handle {
    pub(crate) fn new(socket: Socket) -> Self {
        Handle {
            socket: ManuallyDrop::new(socket),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn socket(&self) -> Result<&Socket> {
        if self.closed.load(Ordering::Acquire) {
            return Err(error::illegal_state());
        }
        Ok(&self.socket)
    }

    pub(crate) fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        Platform::close_raw(&self.socket)?;
        Ok(())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn raw(&self) -> RawHandle {
        #[cfg(unix)]
        {
            use std::os::fd::AsRawFd;
            self.socket.as_raw_fd()
        }
        #[cfg(windows)]
        {
            use std::os::windows::io::AsRawSocket;
            self.socket.as_raw_socket()
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !*self.closed.get_mut() {
            // SAFETY: the descriptor is still open and `socket` is never used again.
            unsafe { ManuallyDrop::drop(&mut self.socket) }
        }
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("raw", &self.raw())
            .field("closed", &self.is_closed())
            .finish()
    }
}
