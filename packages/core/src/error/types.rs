use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::codes::{BaseCode, Code, OsCode, ResolverCode, TlsCode};

/// A Result alias where the Err case is `sockline::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed socket operation.
///
/// Every error carries a [`Kind`] and a kind-specific portable [`Code`].
/// Two errors compare equal when their codes are equal; the raw platform
/// value and the attached source are diagnostic only.
#[derive(Clone)]
pub struct Error {
    pub(crate) inner: Box<Inner>,
}

#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) code: Code,
    pub(crate) raw: i32,
    pub(crate) source: Option<Arc<dyn StdError + Send + Sync>>,
}

/// The family an error code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Conditions raised by this crate itself (eof, illegal state, ...).
    Base,
    /// Operating-system socket errors (errno / WSAGetLastError).
    Os,
    /// Name resolution failures.
    Resolver,
    /// TLS context or session failures.
    Tls,
}

impl Error {
    pub fn new(code: impl Into<Code>) -> Error {
        Error {
            inner: Box::new(Inner {
                code: code.into(),
                raw: 0,
                source: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(Arc::from(source.into()));
        self
    }

    #[must_use]
    pub(crate) fn with_raw(mut self, raw: i32) -> Error {
        self.inner.raw = raw;
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.code.kind()
    }

    #[must_use]
    pub fn code(&self) -> Code {
        self.inner.code
    }

    /// The platform value this error was classified from, if any.
    #[must_use]
    pub fn raw_code(&self) -> Option<i32> {
        (self.inner.raw != 0).then_some(self.inner.raw)
    }

    /// The human-readable message for this error.
    ///
    /// TLS errors that wrap a library error render that error; everything
    /// else uses the canonical message of its code.
    #[must_use]
    pub fn message(&self) -> Cow<'static, str> {
        match (&self.inner.code, &self.inner.source) {
            (Code::Tls(_), Some(source)) => Cow::Owned(source.to_string()),
            (code, _) => Cow::Borrowed(code.message()),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("sockline::Error");

        f.field("kind", &self.kind());
        f.field("code", &self.inner.code);

        if self.inner.raw != 0 {
            f.field("raw", &self.inner.raw);
        }

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.inner.code == other.inner.code
    }
}

impl Eq for Error {}

impl Hash for Error {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.code.hash(state);
    }
}

macro_rules! eq_code {
    ($($code:ident => $variant:ident),* $(,)?) => {
        $(
            impl PartialEq<$code> for Error {
                fn eq(&self, other: &$code) -> bool {
                    self.inner.code == Code::$variant(*other)
                }
            }
        )*
    };
}

eq_code! {
    BaseCode => Base,
    OsCode => Os,
    ResolverCode => Resolver,
    TlsCode => Tls,
}
