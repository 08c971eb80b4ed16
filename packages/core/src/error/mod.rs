pub mod classification;
pub mod codes;
pub mod constructors;
pub mod conversions;
pub mod types;

pub use codes::{BaseCode, Code, OsCode, ResolverCode, TlsCode};
pub use constructors::*;
pub use types::{Error, Kind, Result};
