#![allow(unsafe_code)]

use std::ffi::CString;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::os::fd::AsRawFd;
use std::ptr;
use std::sync::Once;
use std::time::Duration;

use socket2::Socket;

use super::{Backend, Interest};
use crate::deadline::ceil_millis;
use crate::error::{self, Error, OsCode, ResolverCode, Result};

static INIT: Once = Once::new();

/// POSIX sockets: errno tables, `poll(2)` readiness and `getaddrinfo(3)`.
pub(crate) struct Posix;

impl Backend for Posix {
    // EWOULDBLOCK precedes EAGAIN so a non-blocking miss reads as would-block
    // on platforms where the two share a value.
    const OS_ERRORS: &'static [(i32, OsCode)] = &[
        (libc::EPERM, OsCode::NotPermitted),
        (libc::ENOENT, OsCode::NoEntry),
        (libc::EINTR, OsCode::Interrupted),
        (libc::EIO, OsCode::Io),
        (libc::EBADF, OsCode::BadDescriptor),
        (libc::ENOMEM, OsCode::OutOfMemory),
        (libc::EACCES, OsCode::AccessDenied),
        (libc::EFAULT, OsCode::BadAddress),
        (libc::ENOTDIR, OsCode::NotDirectory),
        (libc::EISDIR, OsCode::IsDirectory),
        (libc::EINVAL, OsCode::InvalidArgument),
        (libc::ENFILE, OsCode::FileTableOverflow),
        (libc::EMFILE, OsCode::TooManyOpenFiles),
        (libc::ENOTTY, OsCode::NotTty),
        (libc::EFBIG, OsCode::FileTooLarge),
        (libc::ENOSPC, OsCode::NoSpace),
        (libc::EROFS, OsCode::ReadOnlyFilesystem),
        (libc::EPIPE, OsCode::BrokenPipe),
        (libc::EWOULDBLOCK, OsCode::WouldBlock),
        (libc::EAGAIN, OsCode::TryAgain),
        (libc::EINPROGRESS, OsCode::InProgress),
        (libc::EALREADY, OsCode::Already),
        (libc::ENOTSOCK, OsCode::NotSocket),
        (libc::EDESTADDRREQ, OsCode::DestinationAddressRequired),
        (libc::EMSGSIZE, OsCode::MessageSize),
        (libc::EPROTOTYPE, OsCode::WrongProtocolType),
        (libc::ENOPROTOOPT, OsCode::ProtocolOptionUnavailable),
        (libc::EPROTONOSUPPORT, OsCode::ProtocolNotSupported),
        (libc::EOPNOTSUPP, OsCode::OperationNotSupported),
        (libc::EAFNOSUPPORT, OsCode::AddressFamilyNotSupported),
        (libc::EADDRINUSE, OsCode::AddressInUse),
        (libc::EADDRNOTAVAIL, OsCode::AddressNotAvailable),
        (libc::ENETDOWN, OsCode::NetworkDown),
        (libc::ENETUNREACH, OsCode::NetworkUnreachable),
        (libc::ENETRESET, OsCode::NetworkReset),
        (libc::ECONNABORTED, OsCode::ConnectionAborted),
        (libc::ECONNRESET, OsCode::ConnectionReset),
        (libc::ENOBUFS, OsCode::NoBuffers),
        (libc::EISCONN, OsCode::IsConnected),
        (libc::ENOTCONN, OsCode::NotConnected),
        (libc::ETIMEDOUT, OsCode::TimedOut),
        (libc::ECONNREFUSED, OsCode::ConnectionRefused),
        (libc::ELOOP, OsCode::SymlinkLoop),
        (libc::ENAMETOOLONG, OsCode::NameTooLong),
        (libc::EHOSTUNREACH, OsCode::HostUnreachable),
        (libc::EPROTO, OsCode::Protocol),
    ];

    const RESOLVER_ERRORS: &'static [(i32, ResolverCode)] = RESOLVER_ERRORS;

    const MAX_BACKLOG: i32 = libc::SOMAXCONN;

    fn init() {
        INIT.call_once(|| {
            // a write to a reset peer must surface as EPIPE, not kill the process
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_IGN);
            }
            tracing::debug!("POSIX socket layer initialized");
        });
    }

    fn is_connect_in_progress(raw: i32) -> bool {
        raw == libc::EINPROGRESS || raw == libc::EALREADY || raw == libc::EINTR
    }

    fn is_already_connected(raw: i32) -> bool {
        raw == libc::EISCONN
    }

    fn poll(socket: &Socket, interest: Interest, timeout: Duration) -> io::Result<bool> {
        let events = match interest {
            Interest::Read => libc::POLLIN,
            Interest::Write | Interest::Connect => libc::POLLOUT,
        };
        let mut fds = libc::pollfd {
            fd: socket.as_raw_fd(),
            events,
            revents: 0,
        };

        let rc = unsafe { libc::poll(&mut fds, 1, ceil_millis(timeout)) };
        match rc {
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    fn close_raw(socket: &Socket) -> io::Result<()> {
        if unsafe { libc::close(socket.as_raw_fd()) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn resolve(host: &str) -> Result<Vec<IpAddr>> {
        Self::init();

        let c_host = CString::new(host).map_err(|e| error::illegal_argument().with(e))?;
        let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
        hints.ai_family = libc::AF_UNSPEC;
        hints.ai_socktype = libc::SOCK_STREAM;

        let mut res: *mut libc::addrinfo = ptr::null_mut();
        let status = unsafe { libc::getaddrinfo(c_host.as_ptr(), ptr::null(), &hints, &mut res) };
        if status != 0 {
            if status == libc::EAI_SYSTEM {
                return Err(Error::last_os_error());
            }
            return Err(Error::resolver(status));
        }

        let mut addrs = Vec::new();
        let mut cursor = res;
        while !cursor.is_null() {
            // SAFETY: getaddrinfo returned a valid list terminated by a null ai_next.
            let info = unsafe { &*cursor };
            if !info.ai_addr.is_null() {
                match info.ai_family {
                    libc::AF_INET => {
                        let sin = unsafe { &*(info.ai_addr as *const libc::sockaddr_in) };
                        addrs.push(IpAddr::V4(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr))));
                    }
                    libc::AF_INET6 => {
                        let sin6 = unsafe { &*(info.ai_addr as *const libc::sockaddr_in6) };
                        addrs.push(IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)));
                    }
                    _ => {}
                }
            }
            cursor = info.ai_next;
        }
        unsafe { libc::freeaddrinfo(res) };

        Ok(addrs)
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
const RESOLVER_ERRORS: &[(i32, ResolverCode)] = &[
    (libc::EAI_NONAME, ResolverCode::HostNotFound),
    (libc::EAI_AGAIN, ResolverCode::TryAgain),
    (libc::EAI_FAIL, ResolverCode::NoRecovery),
    // EAI_NODATA, not exported by every libc build
    (-5, ResolverCode::NoData),
];

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
const RESOLVER_ERRORS: &[(i32, ResolverCode)] = &[
    (libc::EAI_NONAME, ResolverCode::HostNotFound),
    (libc::EAI_AGAIN, ResolverCode::TryAgain),
    (libc::EAI_FAIL, ResolverCode::NoRecovery),
];
