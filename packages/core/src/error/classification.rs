use std::io;

use super::codes::{BaseCode, Code, OsCode, ResolverCode, TlsCode};
use super::types::{Error, Kind};
use crate::sys::{Backend, Platform};

impl Error {
    /// Classifies a raw platform value into the taxonomy.
    ///
    /// A raw value of zero means "no error" and yields `None`. Any other
    /// value yields an error of `kind`; values missing from the platform
    /// table map to that kind's `Unknown` code.
    #[must_use]
    pub fn classify(kind: Kind, raw: i32) -> Option<Error> {
        if raw == 0 {
            return None;
        }

        let code = match kind {
            Kind::Base => Code::Base(lookup(BaseCode::TABLE, raw).unwrap_or(BaseCode::Unknown)),
            Kind::Os => Code::Os(lookup(Platform::OS_ERRORS, raw).unwrap_or(OsCode::Unknown)),
            Kind::Resolver => Code::Resolver(
                lookup(Platform::RESOLVER_ERRORS, raw).unwrap_or(ResolverCode::Unknown),
            ),
            Kind::Tls => Code::Tls(lookup(TlsCode::TABLE, raw).unwrap_or(TlsCode::Unknown)),
        };

        Some(Error::new(code).with_raw(raw))
    }

    /// Classifies an OS error number, falling back to `Os(Unknown)` for zero.
    #[must_use]
    pub fn os(raw: i32) -> Error {
        Error::classify(Kind::Os, raw).unwrap_or_else(|| Error::new(OsCode::Unknown))
    }

    /// Classifies a resolver status, falling back to `Resolver(Unknown)` for zero.
    #[must_use]
    pub fn resolver(raw: i32) -> Error {
        Error::classify(Kind::Resolver, raw).unwrap_or_else(|| Error::new(ResolverCode::Unknown))
    }

    /// The calling thread's last socket error.
    #[must_use]
    pub fn last_os_error() -> Error {
        Error::from(io::Error::last_os_error())
    }

    /// The OS error number this error was classified from.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self.inner.code {
            Code::Os(_) => self.raw_code(),
            _ => None,
        }
    }

    /// Returns true if the operation ran out of its time budget.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.inner.code == Code::Os(OsCode::TimedOut)
    }

    /// Returns true if the peer closed the stream.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.inner.code == Code::Base(BaseCode::Eof)
    }

    /// Returns true for a non-blocking call that could not make progress.
    #[must_use]
    pub fn is_would_block(&self) -> bool {
        matches!(self.inner.code, Code::Os(OsCode::WouldBlock | OsCode::TryAgain))
    }

    #[must_use]
    pub fn is_resolver(&self) -> bool {
        self.kind() == Kind::Resolver
    }

    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.kind() == Kind::Tls
    }
}

fn lookup<C: Copy>(table: &[(i32, C)], raw: i32) -> Option<C> {
    table
        .iter()
        .find(|(value, _)| *value == raw)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_never_an_error() {
        for kind in [Kind::Base, Kind::Os, Kind::Resolver, Kind::Tls] {
            assert!(Error::classify(kind, 0).is_none());
        }
    }

    #[test]
    fn unknown_values_keep_their_kind() {
        let err = Error::classify(Kind::Os, 987_654).expect("non-zero classifies");
        assert_eq!(err.kind(), Kind::Os);
        assert_eq!(err, OsCode::Unknown);
        assert_eq!(err.raw_os_error(), Some(987_654));

        let err = Error::classify(Kind::Resolver, 987_654).expect("non-zero classifies");
        assert_eq!(err, ResolverCode::Unknown);
    }

    #[test]
    fn every_table_entry_round_trips() {
        for &(raw, code) in Platform::OS_ERRORS {
            let err = Error::os(raw);
            // first match wins when two names share one value
            let first = lookup(Platform::OS_ERRORS, raw).expect("present");
            assert_eq!(err, first, "raw {raw} expected {code:?}");
            assert!(!err.message().is_empty());
        }
        for &(raw, code) in TlsCode::TABLE {
            assert_eq!(Error::classify(Kind::Tls, raw).expect("non-zero"), code);
        }
        for &(raw, code) in BaseCode::TABLE {
            assert_eq!(Error::classify(Kind::Base, raw).expect("non-zero"), code);
        }
    }

    #[cfg(unix)]
    #[test]
    fn posix_values_classify() {
        assert_eq!(Error::os(libc::ETIMEDOUT), OsCode::TimedOut);
        assert_eq!(Error::os(libc::ECONNREFUSED), OsCode::ConnectionRefused);
        assert_eq!(Error::os(libc::EINPROGRESS), OsCode::InProgress);
        assert_eq!(Error::os(libc::EWOULDBLOCK), OsCode::WouldBlock);
        assert!(Error::os(libc::EWOULDBLOCK).is_would_block());
        assert!(!Error::os(libc::ETIMEDOUT).is_would_block());
        assert_eq!(Error::resolver(libc::EAI_NONAME), ResolverCode::HostNotFound);
    }

    #[test]
    fn equality_ignores_raw_value_and_source() {
        let a = Error::new(OsCode::TimedOut).with_raw(1);
        let b = Error::new(OsCode::TimedOut).with("context");
        assert_eq!(a, b);
        assert_ne!(a, Error::new(BaseCode::Eof));
    }

    #[test]
    fn timeout_and_eof_are_distinct() {
        let timeout = Error::new(OsCode::TimedOut);
        let eof = Error::new(BaseCode::Eof);
        assert!(timeout.is_timeout() && !timeout.is_eof());
        assert!(eof.is_eof() && !eof.is_timeout());
    }
}
