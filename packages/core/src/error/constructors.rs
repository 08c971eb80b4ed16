use super::codes::{BaseCode, OsCode, TlsCode};
use super::types::Error;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a stream that ended before the operation completed.
pub fn eof() -> Error {
    Error::new(BaseCode::Eof)
}

/// Creates an `Error` for an argument outside its accepted range.
pub fn illegal_argument() -> Error {
    Error::new(BaseCode::IllegalArgument)
}

/// Creates an `Error` for an operation invalid in the current state.
pub fn illegal_state() -> Error {
    Error::new(BaseCode::IllegalState)
}

/// Creates an `Error` for an exhausted time budget.
pub fn timed_out() -> Error {
    Error::new(OsCode::TimedOut)
}

/// Creates a TLS `Error` carrying the library error that caused it.
pub fn tls<E: Into<BoxError>>(code: TlsCode, source: E) -> Error {
    Error::new(code).with(source)
}
