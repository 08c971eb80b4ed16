//! Portable error codes.
//!
//! Each kind has its own closed code set ending in `Unknown`. The platform
//! raw values for `Os` and `Resolver` codes live in the backend tables under
//! `sys`; `Base` and `Tls` codes are produced by this crate only and use
//! their discriminants as raw values.

use super::types::Kind;

/// A kind-tagged portable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Base(BaseCode),
    Os(OsCode),
    Resolver(ResolverCode),
    Tls(TlsCode),
}

impl Code {
    #[must_use]
    pub fn kind(self) -> Kind {
        match self {
            Code::Base(_) => Kind::Base,
            Code::Os(_) => Kind::Os,
            Code::Resolver(_) => Kind::Resolver,
            Code::Tls(_) => Kind::Tls,
        }
    }

    /// The canonical message for this code.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Code::Base(code) => code.message(),
            Code::Os(code) => code.message(),
            Code::Resolver(code) => code.message(),
            Code::Tls(code) => code.message(),
        }
    }

    /// Whether this is the `Unknown` code of its kind.
    #[must_use]
    pub fn is_unknown(self) -> bool {
        matches!(
            self,
            Code::Base(BaseCode::Unknown)
                | Code::Os(OsCode::Unknown)
                | Code::Resolver(ResolverCode::Unknown)
                | Code::Tls(TlsCode::Unknown)
        )
    }
}

/// Conditions detected by this crate rather than reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum BaseCode {
    Eof = 1,
    IllegalArgument = 2,
    IllegalState = 3,
    NotFound = 4,
    Unknown = -1,
}

impl BaseCode {
    pub(crate) const TABLE: &'static [(i32, BaseCode)] = &[
        (BaseCode::Eof as i32, BaseCode::Eof),
        (BaseCode::IllegalArgument as i32, BaseCode::IllegalArgument),
        (BaseCode::IllegalState as i32, BaseCode::IllegalState),
        (BaseCode::NotFound as i32, BaseCode::NotFound),
    ];

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            BaseCode::Eof => "end of file",
            BaseCode::IllegalArgument => "illegal argument",
            BaseCode::IllegalState => "illegal state",
            BaseCode::NotFound => "not found",
            BaseCode::Unknown => "unknown error",
        }
    }
}

/// Socket-level operating system errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsCode {
    NotPermitted,
    NoEntry,
    Interrupted,
    Io,
    BadDescriptor,
    OutOfMemory,
    AccessDenied,
    BadAddress,
    NotDirectory,
    IsDirectory,
    InvalidArgument,
    FileTableOverflow,
    TooManyOpenFiles,
    NotTty,
    FileTooLarge,
    NoSpace,
    ReadOnlyFilesystem,
    BrokenPipe,
    TryAgain,
    WouldBlock,
    InProgress,
    Already,
    NotSocket,
    DestinationAddressRequired,
    MessageSize,
    WrongProtocolType,
    ProtocolOptionUnavailable,
    ProtocolNotSupported,
    OperationNotSupported,
    AddressFamilyNotSupported,
    AddressInUse,
    AddressNotAvailable,
    NetworkDown,
    NetworkUnreachable,
    NetworkReset,
    ConnectionAborted,
    ConnectionReset,
    NoBuffers,
    IsConnected,
    NotConnected,
    TimedOut,
    ConnectionRefused,
    SymlinkLoop,
    NameTooLong,
    HostUnreachable,
    Protocol,
    Unknown,
}

impl OsCode {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            OsCode::NotPermitted => "operation not permitted",
            OsCode::NoEntry => "no such file or directory",
            OsCode::Interrupted => "interrupted system call",
            OsCode::Io => "input/output error",
            OsCode::BadDescriptor => "bad file descriptor",
            OsCode::OutOfMemory => "cannot allocate memory",
            OsCode::AccessDenied => "permission denied",
            OsCode::BadAddress => "bad address",
            OsCode::NotDirectory => "not a directory",
            OsCode::IsDirectory => "is a directory",
            OsCode::InvalidArgument => "invalid argument",
            OsCode::FileTableOverflow => "too many open files in system",
            OsCode::TooManyOpenFiles => "too many open files",
            OsCode::NotTty => "inappropriate ioctl for device",
            OsCode::FileTooLarge => "file too large",
            OsCode::NoSpace => "no space left on device",
            OsCode::ReadOnlyFilesystem => "read-only file system",
            OsCode::BrokenPipe => "broken pipe",
            OsCode::TryAgain => "resource temporarily unavailable",
            OsCode::WouldBlock => "operation would block",
            OsCode::InProgress => "operation now in progress",
            OsCode::Already => "operation already in progress",
            OsCode::NotSocket => "socket operation on non-socket",
            OsCode::DestinationAddressRequired => "destination address required",
            OsCode::MessageSize => "message too long",
            OsCode::WrongProtocolType => "protocol wrong type for socket",
            OsCode::ProtocolOptionUnavailable => "protocol not available",
            OsCode::ProtocolNotSupported => "protocol not supported",
            OsCode::OperationNotSupported => "operation not supported",
            OsCode::AddressFamilyNotSupported => "address family not supported by protocol",
            OsCode::AddressInUse => "address already in use",
            OsCode::AddressNotAvailable => "cannot assign requested address",
            OsCode::NetworkDown => "network is down",
            OsCode::NetworkUnreachable => "network is unreachable",
            OsCode::NetworkReset => "network dropped connection on reset",
            OsCode::ConnectionAborted => "software caused connection abort",
            OsCode::ConnectionReset => "connection reset by peer",
            OsCode::NoBuffers => "no buffer space available",
            OsCode::IsConnected => "transport endpoint is already connected",
            OsCode::NotConnected => "transport endpoint is not connected",
            OsCode::TimedOut => "connection timed out",
            OsCode::ConnectionRefused => "connection refused",
            OsCode::SymlinkLoop => "too many levels of symbolic links",
            OsCode::NameTooLong => "file name too long",
            OsCode::HostUnreachable => "no route to host",
            OsCode::Protocol => "protocol error",
            OsCode::Unknown => "unknown error",
        }
    }
}

/// Name resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverCode {
    HostNotFound,
    TryAgain,
    NoRecovery,
    NoData,
    Unknown,
}

impl ResolverCode {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ResolverCode::HostNotFound => "host not found",
            ResolverCode::TryAgain => "temporary failure in name resolution",
            ResolverCode::NoRecovery => "non-recoverable failure in name resolution",
            ResolverCode::NoData => "no address associated with host name",
            ResolverCode::Unknown => "unknown resolver error",
        }
    }
}

/// TLS context and session failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TlsCode {
    /// Peer certificate missing or chain verification failed.
    Certificate = 1,
    BadCertificateFile = 2,
    BadPrivateKey = 3,
    /// The private key does not match the certificate.
    KeyMismatch = 4,
    Handshake = 5,
    /// The peer sent a fatal alert.
    Alert = 6,
    InvalidServerName = 7,
    /// Operation on a session that has already been shut down.
    Closed = 8,
    Unknown = -1,
}

impl TlsCode {
    pub(crate) const TABLE: &'static [(i32, TlsCode)] = &[
        (TlsCode::Certificate as i32, TlsCode::Certificate),
        (TlsCode::BadCertificateFile as i32, TlsCode::BadCertificateFile),
        (TlsCode::BadPrivateKey as i32, TlsCode::BadPrivateKey),
        (TlsCode::KeyMismatch as i32, TlsCode::KeyMismatch),
        (TlsCode::Handshake as i32, TlsCode::Handshake),
        (TlsCode::Alert as i32, TlsCode::Alert),
        (TlsCode::InvalidServerName as i32, TlsCode::InvalidServerName),
        (TlsCode::Closed as i32, TlsCode::Closed),
    ];

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            TlsCode::Certificate => "certificate verification failed",
            TlsCode::BadCertificateFile => "unable to load certificate file",
            TlsCode::BadPrivateKey => "unable to load private key",
            TlsCode::KeyMismatch => "private key does not match certificate",
            TlsCode::Handshake => "handshake failed",
            TlsCode::Alert => "fatal alert received from peer",
            TlsCode::InvalidServerName => "invalid server name",
            TlsCode::Closed => "session closed",
            TlsCode::Unknown => "unknown TLS error",
        }
    }
}

impl From<BaseCode> for Code {
    fn from(code: BaseCode) -> Self {
        Code::Base(code)
    }
}

impl From<OsCode> for Code {
    fn from(code: OsCode) -> Self {
        Code::Os(code)
    }
}

impl From<ResolverCode> for Code {
    fn from(code: ResolverCode) -> Self {
        Code::Resolver(code)
    }
}

impl From<TlsCode> for Code {
    fn from(code: TlsCode) -> Self {
        Code::Tls(code)
    }
}
