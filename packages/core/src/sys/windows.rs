#![allow(unsafe_code)]

use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::os::windows::io::AsRawSocket;
use std::ptr;
use std::sync::Once;
use std::time::Duration;

use socket2::Socket;
use windows_sys::Win32::Networking::WinSock::{
    self, FD_SET, SOCKET, SOCKET_ERROR, SOMAXCONN, TIMEVAL, WSADATA,
};

use super::{Backend, Interest};
use crate::error::{Error, OsCode, ResolverCode, Result};

static INIT: Once = Once::new();

/// Winsock: WSA error tables, `select` readiness and the system resolver.
pub(crate) struct Winsock;

impl Backend for Winsock {
    const OS_ERRORS: &'static [(i32, OsCode)] = &[
        (WinSock::WSAEINTR, OsCode::Interrupted),
        (WinSock::WSAEBADF, OsCode::BadDescriptor),
        (WinSock::WSAEACCES, OsCode::AccessDenied),
        (WinSock::WSAEFAULT, OsCode::BadAddress),
        (WinSock::WSAEINVAL, OsCode::InvalidArgument),
        (WinSock::WSAEMFILE, OsCode::TooManyOpenFiles),
        (WinSock::WSAEWOULDBLOCK, OsCode::WouldBlock),
        (WinSock::WSAEINPROGRESS, OsCode::InProgress),
        (WinSock::WSAEALREADY, OsCode::Already),
        (WinSock::WSAENOTSOCK, OsCode::NotSocket),
        (WinSock::WSAEDESTADDRREQ, OsCode::DestinationAddressRequired),
        (WinSock::WSAEMSGSIZE, OsCode::MessageSize),
        (WinSock::WSAEPROTOTYPE, OsCode::WrongProtocolType),
        (WinSock::WSAENOPROTOOPT, OsCode::ProtocolOptionUnavailable),
        (WinSock::WSAEPROTONOSUPPORT, OsCode::ProtocolNotSupported),
        (WinSock::WSAEOPNOTSUPP, OsCode::OperationNotSupported),
        (WinSock::WSAEAFNOSUPPORT, OsCode::AddressFamilyNotSupported),
        (WinSock::WSAEADDRINUSE, OsCode::AddressInUse),
        (WinSock::WSAEADDRNOTAVAIL, OsCode::AddressNotAvailable),
        (WinSock::WSAENETDOWN, OsCode::NetworkDown),
        (WinSock::WSAENETUNREACH, OsCode::NetworkUnreachable),
        (WinSock::WSAENETRESET, OsCode::NetworkReset),
        (WinSock::WSAECONNABORTED, OsCode::ConnectionAborted),
        (WinSock::WSAECONNRESET, OsCode::ConnectionReset),
        (WinSock::WSAENOBUFS, OsCode::NoBuffers),
        (WinSock::WSAEISCONN, OsCode::IsConnected),
        (WinSock::WSAENOTCONN, OsCode::NotConnected),
        (WinSock::WSAETIMEDOUT, OsCode::TimedOut),
        (WinSock::WSAECONNREFUSED, OsCode::ConnectionRefused),
        (WinSock::WSAELOOP, OsCode::SymlinkLoop),
        (WinSock::WSAENAMETOOLONG, OsCode::NameTooLong),
        (WinSock::WSAEHOSTUNREACH, OsCode::HostUnreachable),
    ];

    const RESOLVER_ERRORS: &'static [(i32, ResolverCode)] = &[
        (WinSock::WSAHOST_NOT_FOUND, ResolverCode::HostNotFound),
        (WinSock::WSATRY_AGAIN, ResolverCode::TryAgain),
        (WinSock::WSANO_RECOVERY, ResolverCode::NoRecovery),
        (WinSock::WSANO_DATA, ResolverCode::NoData),
    ];

    const MAX_BACKLOG: i32 = SOMAXCONN as i32;

    fn init() {
        INIT.call_once(|| {
            let mut data: WSADATA = unsafe { std::mem::zeroed() };
            let rc = unsafe { WinSock::WSAStartup(0x0202, &mut data) };
            if rc != 0 {
                // socket creation will report the failure with its own code
                tracing::warn!("WSAStartup failed: {}", rc);
            } else {
                tracing::debug!("Winsock 2.2 initialized");
            }
        });
    }

    fn is_connect_in_progress(raw: i32) -> bool {
        raw == WinSock::WSAEWOULDBLOCK || raw == WinSock::WSAEINPROGRESS || raw == WinSock::WSAEALREADY
    }

    fn is_already_connected(raw: i32) -> bool {
        raw == WinSock::WSAEISCONN
    }

    fn poll(socket: &Socket, interest: Interest, timeout: Duration) -> io::Result<bool> {
        let raw = socket.as_raw_socket() as SOCKET;
        let mut primary = single_set(raw);
        let mut except = single_set(raw);

        let micros = timeout.as_micros().min(i32::MAX as u128 * 1_000_000);
        let tv = TIMEVAL {
            tv_sec: (micros / 1_000_000) as i32,
            tv_usec: (micros % 1_000_000) as i32,
        };

        let rc = unsafe {
            match interest {
                Interest::Read => WinSock::select(0, &mut primary, ptr::null_mut(), ptr::null_mut(), &tv),
                Interest::Write => WinSock::select(0, ptr::null_mut(), &mut primary, ptr::null_mut(), &tv),
                // a failed connect is only reported through the exception set
                Interest::Connect => WinSock::select(0, ptr::null_mut(), &mut primary, &mut except, &tv),
            }
        };

        match rc {
            SOCKET_ERROR => Err(io::Error::from_raw_os_error(unsafe { WinSock::WSAGetLastError() })),
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    fn close_raw(socket: &Socket) -> io::Result<()> {
        let raw = socket.as_raw_socket() as SOCKET;
        if unsafe { WinSock::closesocket(raw) } == SOCKET_ERROR {
            return Err(io::Error::from_raw_os_error(unsafe { WinSock::WSAGetLastError() }));
        }
        Ok(())
    }

    fn resolve(host: &str) -> Result<Vec<IpAddr>> {
        Self::init();

        match (host, 0u16).to_socket_addrs() {
            Ok(addrs) => Ok(addrs.map(|addr| addr.ip()).collect()),
            Err(e) => match e.raw_os_error() {
                Some(raw) => Err(Error::resolver(raw)),
                None => Err(Error::new(ResolverCode::Unknown).with(e)),
            },
        }
    }
}

fn single_set(raw: SOCKET) -> FD_SET {
    let mut set = FD_SET {
        fd_count: 1,
        fd_array: [0; 64],
    };
    set.fd_array[0] = raw;
    set
}
