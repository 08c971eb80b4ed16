use std::io;

use super::codes::{BaseCode, Code, OsCode, TlsCode};
use super::constructors::BoxError;
use super::types::Error;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if let Some(raw) = err.raw_os_error() {
            return Error::os(raw);
        }

        let kind = err.kind();
        match err.into_inner() {
            Some(inner) => unwrap_io_payload(kind, inner),
            None => Error::new(code_for_io_kind(kind)),
        }
    }
}

// io::Error built by `Error::into_io` or by rustls carries the original value
fn unwrap_io_payload(kind: io::ErrorKind, inner: BoxError) -> Error {
    let inner = match inner.downcast::<Error>() {
        Ok(err) => return *err,
        Err(inner) => inner,
    };
    match inner.downcast::<rustls::Error>() {
        Ok(err) => Error::from(*err),
        Err(inner) => Error::new(code_for_io_kind(kind)).with(inner),
    }
}

fn code_for_io_kind(kind: io::ErrorKind) -> Code {
    use io::ErrorKind as K;

    match kind {
        K::UnexpectedEof => Code::Base(BaseCode::Eof),
        K::InvalidInput => Code::Base(BaseCode::IllegalArgument),
        K::NotFound => Code::Base(BaseCode::NotFound),
        K::TimedOut => Code::Os(OsCode::TimedOut),
        K::WouldBlock => Code::Os(OsCode::WouldBlock),
        K::Interrupted => Code::Os(OsCode::Interrupted),
        K::PermissionDenied => Code::Os(OsCode::AccessDenied),
        K::ConnectionRefused => Code::Os(OsCode::ConnectionRefused),
        K::ConnectionReset => Code::Os(OsCode::ConnectionReset),
        K::ConnectionAborted => Code::Os(OsCode::ConnectionAborted),
        K::NotConnected => Code::Os(OsCode::NotConnected),
        K::AddrInUse => Code::Os(OsCode::AddressInUse),
        K::AddrNotAvailable => Code::Os(OsCode::AddressNotAvailable),
        K::BrokenPipe => Code::Os(OsCode::BrokenPipe),
        K::OutOfMemory => Code::Os(OsCode::OutOfMemory),
        _ => Code::Base(BaseCode::Unknown),
    }
}

impl From<rustls::Error> for Error {
    fn from(err: rustls::Error) -> Self {
        use rustls::Error as E;

        let code = match &err {
            E::InvalidCertificate(_) | E::NoCertificatesPresented => TlsCode::Certificate,
            E::AlertReceived(_) => TlsCode::Alert,
            E::InconsistentKeys(_) => TlsCode::KeyMismatch,
            E::UnsupportedNameType => TlsCode::InvalidServerName,
            E::InappropriateMessage { .. }
            | E::InappropriateHandshakeMessage { .. }
            | E::InvalidMessage(_)
            | E::PeerIncompatible(_)
            | E::PeerMisbehaved(_)
            | E::DecryptError
            | E::HandshakeNotComplete
            | E::NoApplicationProtocol => TlsCode::Handshake,
            _ => TlsCode::Unknown,
        };

        Error::new(code).with(err)
    }
}

impl Error {
    /// Converts into an `io::Error` that converts back losslessly.
    #[must_use]
    pub fn into_io(self) -> io::Error {
        use io::ErrorKind as K;

        let kind = match self.inner.code {
            Code::Base(BaseCode::Eof) => K::UnexpectedEof,
            Code::Base(BaseCode::IllegalArgument) => K::InvalidInput,
            Code::Base(BaseCode::NotFound) => K::NotFound,
            Code::Os(OsCode::TimedOut) => K::TimedOut,
            Code::Os(OsCode::WouldBlock | OsCode::TryAgain) => K::WouldBlock,
            Code::Os(OsCode::Interrupted) => K::Interrupted,
            Code::Os(OsCode::ConnectionRefused) => K::ConnectionRefused,
            Code::Os(OsCode::ConnectionReset) => K::ConnectionReset,
            Code::Os(OsCode::ConnectionAborted) => K::ConnectionAborted,
            Code::Os(OsCode::NotConnected) => K::NotConnected,
            Code::Os(OsCode::BrokenPipe) => K::BrokenPipe,
            Code::Os(OsCode::AddressInUse) => K::AddrInUse,
            Code::Os(OsCode::AddressNotAvailable) => K::AddrNotAvailable,
            _ => K::Other,
        };

        io::Error::new(kind, self)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        err.into_io()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Kind, ResolverCode};

    #[test]
    fn io_round_trip_preserves_code() {
        let original = Error::new(ResolverCode::TryAgain);
        let io = original.clone().into_io();
        assert_eq!(Error::from(io), original);
    }

    #[test]
    fn io_kinds_map_without_raw_value() {
        let err = Error::from(io::Error::from(io::ErrorKind::TimedOut));
        assert!(err.is_timeout());
        let err = Error::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(err.is_eof());
    }

    #[test]
    fn rustls_errors_keep_library_message() {
        let err = Error::from(rustls::Error::NoCertificatesPresented);
        assert_eq!(err, TlsCode::Certificate);
        assert_eq!(err.kind(), Kind::Tls);
        assert_eq!(err.message(), rustls::Error::NoCertificatesPresented.to_string());
    }

    #[test]
    fn rustls_errors_inside_io_are_unwrapped() {
        let io = io::Error::new(io::ErrorKind::InvalidData, rustls::Error::DecryptError);
        assert_eq!(Error::from(io), TlsCode::Handshake);
    }
}
